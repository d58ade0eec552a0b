use super::*;
use std::error::Error as _;

#[test]
fn test_template_not_found_display() {
    let error = Error::TemplateNotFound("worker.py".to_string());
    assert_eq!(error.to_string(), "Template not found: worker.py");
}

#[test]
fn test_template_render_names_template_and_cause() {
    let error = Error::TemplateRender {
        template: "wrangler.toml".to_string(),
        source: HandlebarsError::VariableValidation {
            variable: "derived.kv_binding".to_string(),
            reason: "missing".to_string(),
        },
    };

    let message = error.to_string();
    assert!(message.contains("wrangler.toml"));
    assert!(message.contains("derived.kv_binding"));
    assert!(error.source().is_some());
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
