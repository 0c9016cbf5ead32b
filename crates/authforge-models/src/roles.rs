/// Role granted to every newly registered identity.
///
/// The role must already exist in the role store; the initial migration and
/// `authforge-cli seed-roles` both create it.
pub const DEFAULT_ROLE: &str = "User";
