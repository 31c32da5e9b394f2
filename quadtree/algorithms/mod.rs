// 四叉树算法模块
//
// 按功能分解为不同的子模块，每个子模块为 QuadTree / Node 追加一组方法：
// - insert: 插入、细分以及重复点/深度上限检查
// - delete: 删除与收缩
// - search: 成员判断、范围查询、半径查询与遍历
// - persistence: 持久化（JSON / 二进制快照）
// - debug: 结构不变量检查与调试输出

pub mod debug;
pub mod delete;
pub mod insert;
pub mod persistence;
pub mod search;
