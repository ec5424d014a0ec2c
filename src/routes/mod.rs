/// Router Module Index
///
/// Routes are split by access rule so each group gets exactly one guard layer.

/// Routes accessible to everyone.
pub mod public;

/// Routes behind the `require_user` guard.
pub mod authenticated;

/// The login page, behind the `redirect_authenticated` guard.
pub mod login;
