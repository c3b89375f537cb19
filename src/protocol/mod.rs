// プロトコル層 - メッセージ定義とフレーミング
// コーディネーターとワーカーの両端から参照される

pub mod codec;
pub mod message;

// 公開API
pub use codec::{BoxedReader, BoxedWriter, MessageReader, MessageWriter};
pub use message::{Direction, Message};
