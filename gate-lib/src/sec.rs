pub mod authn {
    /// number of random bytes in a session token
    pub const SESSION_ID_BYTES: usize = 48;

    pub const SESSION_COOKIE: &str = "session_id";

    pub const SESSION_DAYS: i64 = 7;
}
