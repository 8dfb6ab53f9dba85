pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// File name for an editor listen socket: `nvim_<uuid>`.
pub fn socket_name() -> String {
    format!("nvim_{}", new_id())
}
