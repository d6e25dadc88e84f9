/// Identity and credential supplied by the sign-in collaborator.
#[derive(Clone)]
pub struct SessionContext {
    pub owner_id: String,
    /// Restaurant id already known to the session, if any.
    pub restaurant_id: Option<String>,
    pub token: String,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("owner_id", &self.owner_id)
            .field("restaurant_id", &self.restaurant_id)
            .field("token", &"[redacted]")
            .finish()
    }
}
