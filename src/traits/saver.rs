/// Hands a finished export to whatever stores it (a browser download, a
/// file on disk).
pub trait FileSaver {
    fn save(&mut self, file_name: &str, mime_type: &str, contents: &[u8]) -> anyhow::Result<()>;
}
