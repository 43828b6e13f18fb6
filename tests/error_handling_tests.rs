#[cfg(test)]
mod error_handling_tests {
    use cardcraft_server::document::ComposeError;
    use cardcraft_server::guests::{parse_guest_cards, parse_guest_csv, GuestCsvError};
    use cardcraft_server::layout::LayoutError;
    use cardcraft_server::render::{PdfError, RenderError};
    use cardcraft_server::ErrorResponse;
    use std::time::Duration;

    #[test]
    fn test_error_response_shape() {
        let error_response = ErrorResponse::bad_request("Guest 2 has no name");
        assert_eq!(error_response.error, "BadRequest");
        assert!(error_response.message.contains("Guest 2"));
        assert!(chrono::DateTime::parse_from_rfc3339(&error_response.timestamp).is_ok());

        let json = serde_json::to_value(ErrorResponse::not_found("Project not found")).unwrap();
        assert_eq!(json["error"], "NotFound");
    }

    #[test]
    fn test_caller_errors_are_not_generic() {
        let err = PdfError::from(LayoutError::InvalidConfiguration(3));
        assert!(err.is_caller_error());
        assert_eq!(err.kind(), "InvalidConfiguration");
        assert!(err.user_message().contains('3'));

        let err = PdfError::from(ComposeError::EmptyInput);
        assert!(err.is_caller_error());
        assert_eq!(err.kind(), "EmptyInput");
    }

    #[test]
    fn test_render_errors_use_generic_message() {
        let err = PdfError::Render(RenderError::Timeout(Duration::from_secs(60)));
        assert!(!err.is_caller_error());
        assert_eq!(err.kind(), "RenderTimeout");
        assert!(!err.user_message().contains("timed out"));
    }

    #[test]
    fn test_guest_list_errors_name_lines() {
        let csv = "Name,Gift,Message\nAnn,Vase,Thanks\n,Toaster,\nCy,,\n";
        match parse_guest_csv(csv.as_bytes()) {
            Err(GuestCsvError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.to_string().contains("line 3"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_guest_list_quoted_fields() {
        let csv = "Name,Gift,Message\n\"Smith, John\",\"Pots & pans\",\"Line one\nLine two\"\n";
        let cards = parse_guest_cards(csv.as_bytes()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].recipient_name, "Smith, John");
        assert_eq!(cards[0].message, "Line one\nLine two");
    }

    #[test]
    fn test_malformed_json_requests() {
        let result: Result<cardcraft_server::document::Card, _> =
            serde_json::from_str("{ malformed json ");
        assert!(result.is_err());
    }
}
