pub(crate) mod edit_modal;
