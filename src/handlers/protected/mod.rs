// Protected handlers: every route here sits behind `require_user_role`
// and receives the caller as an `AuthUser`.
pub mod tasks;
