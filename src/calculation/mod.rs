/// 漲跌幅排行
pub mod movers;
