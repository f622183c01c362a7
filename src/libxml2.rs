//! Safe wrapper around the libxml2 XML Schema FFI.
//!
//! There is no mature pure-Rust library for XML Schema (XSD) validation
//! (roxmltree, quick-xml and friends parse but do not validate), so the
//! actual constraint checking is delegated to libxml2. This module owns all
//! `unsafe` code: it wraps the raw schema, document, and context pointers in
//! RAII types so that every resource is released on every exit path, and it
//! captures libxml2's structured errors so failures can be reported with
//! file and line information.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::sync::{Arc, Once};

use libc::{c_char, c_int, c_void};

use crate::error::{Result, ValidationError};

/// libxml2's global initialization is not thread-safe, so it is guarded by
/// a `Once` and performed at most one time per process.
static LIBXML2_INIT: Once = Once::new();

/// Opaque libxml2 structures
#[repr(C)]
pub struct XmlSchema {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

/// Mirror of libxml2's `xmlError` struct, used by structured error callbacks.
#[repr(C)]
pub struct XmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *mut XmlError)>;

// Suppress libxml2's default stderr reporting for document parsing; errors
// are read back from xmlGetLastError instead.
const XML_PARSE_NOERROR: c_int = 1 << 5;
const XML_PARSE_NOWARNING: c_int = 1 << 6;

#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    fn xmlInitParser();

    // Document parsing
    fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    fn xmlFreeDoc(doc: *mut XmlDoc);
    fn xmlGetLastError() -> *mut XmlError;
    fn xmlResetLastError();

    // Schema parsing
    fn xmlSchemaNewParserCtxt(url: *const c_char) -> *mut XmlSchemaParserCtxt;
    fn xmlSchemaNewMemParserCtxt(buffer: *const c_char, size: c_int) -> *mut XmlSchemaParserCtxt;
    fn xmlSchemaParse(ctxt: *const XmlSchemaParserCtxt) -> *mut XmlSchema;
    fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    fn xmlSchemaFree(schema: *mut XmlSchema);
    fn xmlSchemaSetParserStructuredErrors(
        ctxt: *mut XmlSchemaParserCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );

    // Schema validation
    fn xmlSchemaNewValidCtxt(schema: *const XmlSchema) -> *mut XmlSchemaValidCtxt;
    fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
    fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
}

/// Structured error callback: collects each libxml2 diagnostic as a
/// `file:line: message` string into the `Vec<String>` passed as user data.
unsafe extern "C" fn structured_error_callback(user_data: *mut c_void, error: *mut XmlError) {
    if error.is_null() {
        return;
    }
    let errors = unsafe { &mut *(user_data as *mut Vec<String>) };
    if let Some(formatted) = unsafe { format_xml_error(error) } {
        errors.push(formatted);
    }
}

/// Render an `xmlError` as `file:line: message` (file and line omitted when
/// libxml2 did not record them).
unsafe fn format_xml_error(error: *mut XmlError) -> Option<String> {
    let msg_ptr = unsafe { (*error).message };
    if msg_ptr.is_null() {
        return None;
    }
    let message = unsafe { CStr::from_ptr(msg_ptr) }
        .to_str()
        .ok()?
        .trim()
        .to_string();

    let file_ptr = unsafe { (*error).file };
    let line = unsafe { (*error).line };

    if !file_ptr.is_null() && line > 0 {
        let file = unsafe { CStr::from_ptr(file_ptr) }.to_string_lossy();
        Some(format!("{file}:{line}: {message}"))
    } else if line > 0 {
        Some(format!("line {line}: {message}"))
    } else {
        Some(message)
    }
}

/// Shared, immutable handle to a parsed schema.
///
/// libxml2 schema structures are read-only after parsing and documented as
/// thread-safe for validation, so the raw pointer is wrapped in an `Arc` and
/// freed exactly once when the last clone is dropped.
#[derive(Debug)]
pub struct XmlSchemaPtr {
    inner: Arc<XmlSchemaInner>,
}

#[derive(Debug)]
struct XmlSchemaInner {
    ptr: *mut XmlSchema,
    _phantom: PhantomData<XmlSchema>,
}

// Safety: xmlSchema structures are immutable after xmlSchemaParse returns.
unsafe impl Send for XmlSchemaInner {}
unsafe impl Sync for XmlSchemaInner {}

impl XmlSchemaPtr {
    /// # Safety
    ///
    /// `ptr` must come from `xmlSchemaParse` and must not be freed elsewhere.
    unsafe fn from_raw(ptr: *mut XmlSchema) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        Some(XmlSchemaPtr {
            inner: Arc::new(XmlSchemaInner {
                ptr,
                _phantom: PhantomData,
            }),
        })
    }

    fn as_ptr(&self) -> *const XmlSchema {
        self.inner.ptr
    }

    pub fn is_valid(&self) -> bool {
        !self.inner.ptr.is_null()
    }
}

impl Clone for XmlSchemaPtr {
    fn clone(&self) -> Self {
        XmlSchemaPtr {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for XmlSchemaInner {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlSchemaFree(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Owned handle to a parsed XML document, freed on drop.
struct XmlDocPtr {
    ptr: *mut XmlDoc,
}

impl Drop for XmlDocPtr {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlFreeDoc(self.ptr);
            }
        }
    }
}

/// Outcome of checking one document against one schema.
///
/// This is a verdict, not an error: an invalid document is a normal,
/// expected result of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The document conforms to the schema.
    Valid,
    /// The document is well-formed but violates the schema.
    Invalid {
        error_count: i32,
        errors: Vec<String>,
    },
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationVerdict::Valid)
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ValidationVerdict::Valid => &[],
            ValidationVerdict::Invalid { errors, .. } => errors,
        }
    }
}

/// Safe entry point to libxml2 schema parsing and validation.
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl LibXml2Wrapper {
    /// Create a wrapper, initializing libxml2 on first use.
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });
        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Compile a schema from a local file path.
    ///
    /// Path-based parsing lets libxml2 resolve relative `xs:include` and
    /// `xs:import` references next to the schema file.
    pub fn parse_schema_from_file(&self, path: &str) -> Result<XmlSchemaPtr> {
        let c_path = CString::new(path).map_err(|_| ValidationError::SchemaParse {
            source_name: path.to_string(),
            details: "path contains an interior NUL byte".to_string(),
        })?;

        unsafe {
            let parser_ctxt = xmlSchemaNewParserCtxt(c_path.as_ptr());
            self.finish_schema_parse(parser_ctxt, path)
        }
    }

    /// Compile a schema from an in-memory buffer (e.g. a downloaded XSD).
    pub fn parse_schema_from_memory(
        &self,
        schema_data: &[u8],
        source_name: &str,
    ) -> Result<XmlSchemaPtr> {
        unsafe {
            let parser_ctxt = xmlSchemaNewMemParserCtxt(
                schema_data.as_ptr() as *const c_char,
                schema_data.len() as c_int,
            );
            self.finish_schema_parse(parser_ctxt, source_name)
        }
    }

    /// Run `xmlSchemaParse` on a prepared parser context, capturing
    /// structured errors, and always freeing the context.
    unsafe fn finish_schema_parse(
        &self,
        parser_ctxt: *mut XmlSchemaParserCtxt,
        source_name: &str,
    ) -> Result<XmlSchemaPtr> {
        if parser_ctxt.is_null() {
            return Err(ValidationError::SchemaParse {
                source_name: source_name.to_string(),
                details: "could not create schema parser context".to_string(),
            });
        }

        let mut errors: Vec<String> = Vec::new();
        let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;

        unsafe {
            xmlSchemaSetParserStructuredErrors(
                parser_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );

            let schema_ptr = xmlSchemaParse(parser_ctxt);
            xmlSchemaFreeParserCtxt(parser_ctxt);

            XmlSchemaPtr::from_raw(schema_ptr).ok_or_else(|| ValidationError::SchemaParse {
                source_name: source_name.to_string(),
                details: if errors.is_empty() {
                    "schema could not be parsed".to_string()
                } else {
                    errors.join("\n")
                },
            })
        }
    }

    /// Parse a document held in memory and validate it against `schema`.
    ///
    /// `source_name` is attached to the parsed document so libxml2 error
    /// locations name the original file or URL rather than a buffer.
    ///
    /// A document that is not well-formed XML yields
    /// `ValidationError::DocumentParse`; a well-formed document that breaks
    /// schema constraints yields `Ok(ValidationVerdict::Invalid)`.
    pub fn validate_document(
        &self,
        schema: &XmlSchemaPtr,
        xml_data: &[u8],
        source_name: &str,
    ) -> Result<ValidationVerdict> {
        let doc = self.parse_document(xml_data, source_name)?;

        unsafe {
            let valid_ctxt = xmlSchemaNewValidCtxt(schema.as_ptr());
            if valid_ctxt.is_null() {
                return Err(ValidationError::Internal { code: -1 });
            }

            let mut errors: Vec<String> = Vec::new();
            let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;
            xmlSchemaSetValidStructuredErrors(
                valid_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );

            let code = xmlSchemaValidateDoc(valid_ctxt, doc.ptr);
            xmlSchemaFreeValidCtxt(valid_ctxt);

            match code {
                0 => Ok(ValidationVerdict::Valid),
                n if n > 0 => Ok(ValidationVerdict::Invalid {
                    error_count: n,
                    errors,
                }),
                n => Err(ValidationError::Internal { code: n }),
            }
        }
    }

    fn parse_document(&self, xml_data: &[u8], source_name: &str) -> Result<XmlDocPtr> {
        let c_name = CString::new(source_name).unwrap_or_default();

        unsafe {
            xmlResetLastError();
            let doc_ptr = xmlReadMemory(
                xml_data.as_ptr() as *const c_char,
                xml_data.len() as c_int,
                c_name.as_ptr(),
                std::ptr::null(),
                XML_PARSE_NOERROR | XML_PARSE_NOWARNING,
            );

            if doc_ptr.is_null() {
                let last = xmlGetLastError();
                let details = if last.is_null() {
                    "document is not well-formed XML".to_string()
                } else {
                    format_xml_error(last)
                        .unwrap_or_else(|| "document is not well-formed XML".to_string())
                };
                return Err(ValidationError::DocumentParse {
                    source_name: source_name.to_string(),
                    details,
                });
            }

            Ok(XmlDocPtr { ptr: doc_ptr })
        }
    }
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="root" type="xs:string"/>
</xs:schema>"#;

    const VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root>Hello World</root>"#;

    const INVALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><unexpected>content</unexpected></root>"#;

    const MALFORMED_XML: &str = "<root><unclosed></root>";

    fn parse_simple_schema(wrapper: &LibXml2Wrapper) -> XmlSchemaPtr {
        wrapper
            .parse_schema_from_memory(SIMPLE_XSD.as_bytes(), "simple.xsd")
            .expect("simple schema should parse")
    }

    #[test]
    fn test_schema_parsing_success() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);
        assert!(schema.is_valid());
    }

    #[test]
    fn test_schema_parsing_invalid_schema() {
        let wrapper = LibXml2Wrapper::new();
        let result = wrapper.parse_schema_from_memory(b"<invalid>not a schema</invalid>", "bad.xsd");

        match result {
            Err(ValidationError::SchemaParse { source_name, .. }) => {
                assert_eq!(source_name, "bad.xsd");
            }
            other => panic!("expected SchemaParse error, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_parsing_from_missing_file() {
        let wrapper = LibXml2Wrapper::new();
        let result = wrapper.parse_schema_from_file("/nonexistent/schema.xsd");
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_document() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);

        let verdict = wrapper
            .validate_document(&schema, VALID_XML.as_bytes(), "valid.xml")
            .unwrap();
        assert!(verdict.is_valid());
        assert!(verdict.errors().is_empty());
    }

    #[test]
    fn test_invalid_document_collects_errors() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);

        let verdict = wrapper
            .validate_document(&schema, INVALID_XML.as_bytes(), "invalid.xml")
            .unwrap();

        match verdict {
            ValidationVerdict::Invalid {
                error_count,
                errors,
            } => {
                assert!(error_count > 0);
                assert!(!errors.is_empty());
                // Errors should point back at the named source
                assert!(errors.iter().any(|e| e.contains("invalid.xml")));
            }
            other => panic!("expected Invalid verdict, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);

        let result = wrapper.validate_document(&schema, MALFORMED_XML.as_bytes(), "broken.xml");
        match result {
            Err(ValidationError::DocumentParse { source_name, .. }) => {
                assert_eq!(source_name, "broken.xml");
            }
            other => panic!("expected DocumentParse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_is_parse_error() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);

        let result = wrapper.validate_document(&schema, &[], "empty.xml");
        assert!(matches!(
            result,
            Err(ValidationError::DocumentParse { .. })
        ));
    }

    #[test]
    fn test_schema_ptr_cloning() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);
        let cloned = schema.clone();

        assert!(schema.is_valid());
        assert!(cloned.is_valid());
        assert_eq!(schema.as_ptr(), cloned.as_ptr());
    }

    #[test]
    fn test_schema_drop_then_reparse() {
        let wrapper = LibXml2Wrapper::new();
        {
            let schema = parse_simple_schema(&wrapper);
            assert!(schema.is_valid());
        }
        // Dropping a schema must not poison the parser for later use.
        let schema2 = parse_simple_schema(&wrapper);
        assert!(schema2.is_valid());
    }

    #[test]
    fn test_repeated_validation_is_idempotent() {
        let wrapper = LibXml2Wrapper::new();
        let schema = parse_simple_schema(&wrapper);

        let first = wrapper
            .validate_document(&schema, INVALID_XML.as_bytes(), "invalid.xml")
            .unwrap();
        let second = wrapper
            .validate_document(&schema, INVALID_XML.as_bytes(), "invalid.xml")
            .unwrap();
        assert_eq!(first, second);
    }
}
