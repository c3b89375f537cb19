// 処理ステップの実装
// 外部コマンドを実行するCommandStepと、非同期クロージャを包むFnStep

pub mod command;
pub mod function;

pub use command::CommandStep;
pub use function::FnStep;
