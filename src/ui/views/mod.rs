mod dashboard;
mod detail;
mod editor;
mod login;
mod not_found;
mod posts;
mod users;

pub use dashboard::DashboardView;
pub use detail::DetailView;
pub use login::LoginView;
pub use not_found::NotFoundView;
pub use posts::PostsView;
pub use users::UsersView;
