pub mod catalog;
pub mod classify;
pub mod login_form;

pub use catalog::find_course;
pub use classify::ResponseClassifier;
pub use login_form::login_form_body;
