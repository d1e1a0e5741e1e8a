//! Multipart upload collection and validation for the analyze endpoint.

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::errors::AppError;

pub const RESUME_FIELD: &str = "resume_file";
pub const JD_FIELD: &str = "jd_file";

const WINDOWS_DEVICE_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL"];

/// A file field as received, before validation.
#[derive(Debug)]
pub struct UploadedFile {
    pub field: &'static str,
    pub filename: Option<String>,
    pub content: Result<Bytes, String>,
}

/// A file that passed every upload check.
#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Reads the multipart stream, keeping the first `resume_file` and `jd_file`
/// fields. Read failures on a field's body are kept so validation can report
/// them in order.
pub async fn collect_uploads(
    multipart: &mut Multipart,
) -> Result<(Option<UploadedFile>, Option<UploadedFile>), AppError> {
    let mut resume = None;
    let mut jd = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Failed to read multipart field: {e}");
        AppError::BadRequest(format!("Failed to read multipart data: {e}"))
    })? {
        let slot = match field.name() {
            Some(RESUME_FIELD) if resume.is_none() => (&mut resume, RESUME_FIELD),
            Some(JD_FIELD) if jd.is_none() => (&mut jd, JD_FIELD),
            other => {
                debug!("Ignoring multipart field: {:?}", other);
                continue;
            }
        };

        let filename = field.file_name().map(str::to_string);
        let content = field.bytes().await.map_err(|e| e.to_string());
        *slot.0 = Some(UploadedFile {
            field: slot.1,
            filename,
            content,
        });
    }

    Ok((resume, jd))
}

/// Applies the upload checks in order: presence, filename, extension, content.
pub fn validate_uploads(
    resume: Option<UploadedFile>,
    jd: Option<UploadedFile>,
) -> Result<(ValidatedFile, ValidatedFile), AppError> {
    let (resume, jd) = match (resume, jd) {
        (Some(r), Some(j)) => (r, j),
        (r, j) => {
            let missing: Vec<String> = [(r.is_none(), RESUME_FIELD), (j.is_none(), JD_FIELD)]
                .iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, name)| format!("'{name}'"))
                .collect();
            warn!("Missing upload field(s): {}", missing.join(", "));
            return Err(AppError::BadRequest(format!(
                "Missing {} in the request.",
                missing.join(" and ")
            )));
        }
    };

    let has_name = |f: &UploadedFile| f.filename.as_deref().is_some_and(|n| !n.is_empty());
    if !has_name(&resume) || !has_name(&jd) {
        warn!("One or both uploaded files lack a filename");
        return Err(AppError::BadRequest(
            "Uploaded files must have filenames.".to_string(),
        ));
    }

    let resume_name = checked_pdf_name(&resume)?;
    let jd_name = checked_pdf_name(&jd)?;

    let resume_bytes = read_content(resume, &resume_name)?;
    let jd_bytes = read_content(jd, &jd_name)?;

    Ok((
        ValidatedFile {
            filename: resume_name,
            bytes: resume_bytes,
        },
        ValidatedFile {
            filename: jd_name,
            bytes: jd_bytes,
        },
    ))
}

fn checked_pdf_name(file: &UploadedFile) -> Result<String, AppError> {
    let name = sanitize_filename(file.filename.as_deref().unwrap_or_default());
    if !name.to_lowercase().ends_with(".pdf") {
        warn!("Invalid file type for {}: '{}'", file.field, name);
        return Err(AppError::BadRequest(format!(
            "Invalid file type for '{}' ('{}'). Please upload PDF files only.",
            file.field, name
        )));
    }
    Ok(name)
}

fn read_content(file: UploadedFile, name: &str) -> Result<Bytes, AppError> {
    info!("Reading file: {name}");
    file.content.map_err(|e| {
        warn!("Failed reading '{name}': {e}");
        AppError::BadRequest(format!("Failed to read file content: {e}."))
    })
}

/// Reduces a client-supplied filename to a safe, flat ASCII name.
///
/// The name is NFKD-normalized and reduced to ASCII, path separators become
/// spaces, whitespace runs collapse to `_`, anything outside `[A-Za-z0-9_.-]`
/// is dropped and leading/trailing `.`/`_` are trimmed.
pub fn sanitize_filename(raw: &str) -> String {
    let flattened: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let name = filtered.trim_matches(|c| c == '.' || c == '_').to_string();

    let stem = name.split('.').next().unwrap_or_default();
    if is_windows_device_name(stem) {
        return format!("_{name}");
    }
    name
}

/// `CON`, `PRN`, `AUX`, `NUL`, `COM0`–`COM9` and `LPT0`–`LPT9`, any case.
fn is_windows_device_name(stem: &str) -> bool {
    let upper = stem.to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&upper.as_str()) {
        return true;
    }
    match upper.as_bytes() {
        [b'C', b'O', b'M', d] | [b'L', b'P', b'T', d] => d.is_ascii_digit(),
        _ => false,
    }
}
