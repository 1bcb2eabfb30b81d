// Document generation: input shape resolution, model assembly, DOCX download.
// The pipeline is synchronous and request-scoped; handlers run it off the
// async runtime.

pub mod assembler;
pub mod filename;
pub mod handlers;
pub mod request;
