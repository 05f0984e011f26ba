mod command_input;
mod confirm_dialog;
mod data_table;
mod form_dialog;
mod input;
mod key_result;
mod search_input;
mod toast;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use data_table::{DataTable, TableData};
pub use form_dialog::{FormDialog, FormEvent};
pub use key_result::KeyResult;
pub use toast::{Notifier, ToastKind, Toasts};
