pub mod local_proxy {
    pub const DEFAULT_MODEL: &str = "gpt-4o";
    pub const API_BASE: &str = "http://localhost:3000/v1";
    pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
    pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
    pub const API_BASE_ENV_VAR: &str = "OPENAI_API_BASE";
}
