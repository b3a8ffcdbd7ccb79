/// A request body fed to the parser benchmarks.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    content_type: &'static str,
    file: TestFile,
}

impl TestCase {
    pub const fn new(name: &'static str, content_type: &'static str, file: TestFile) -> Self {
        Self { name, content_type, file }
    }

    pub const fn json(name: &'static str, file: TestFile) -> Self {
        Self::new(name, "application/json", file)
    }

    pub const fn form(name: &'static str, file: TestFile) -> Self {
        Self::new(name, "application/x-www-form-urlencoded", file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.file.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.content.is_empty()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

/// Builds a `multipart/form-data` body of `count` text fields, returning the content type and
/// the payload.
pub fn multipart_fields(count: usize) -> (String, String) {
    const BOUNDARY: &str = "bencher-boundary";

    let mut payload = String::new();
    for i in 0..count {
        payload.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"field{}\"\r\n\r\nvalue {i}\r\n",
            i % 16
        ));
    }
    payload.push_str(&format!("--{BOUNDARY}--\r\n"));

    (format!("multipart/form-data; boundary={BOUNDARY}"), payload)
}
