pub type CmdResult<T> = gostamp::Result<(T, i32)>;

pub mod generate;
