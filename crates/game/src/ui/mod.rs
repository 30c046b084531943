mod info_message;
mod minimap;
mod view;

pub(crate) use info_message::InfoMessage;
pub(crate) use minimap::Minimap;
pub(crate) use view::{GameUiView, SharedUiView};
