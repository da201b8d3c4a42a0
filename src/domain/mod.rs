mod budget;
mod calendar;
mod category;
mod entry;
mod goal;
mod money;
mod projection;
mod recurrence;
mod transaction;
mod user;

pub use budget::*;
pub use calendar::*;
pub use category::*;
pub use entry::*;
pub use goal::*;
pub use money::*;
pub use projection::*;
pub use recurrence::*;
pub use transaction::*;
pub use user::*;
