use serde::{Deserialize, Serialize};

/// Body of `GET /api/data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub files: Vec<String>,
    pub logs: Vec<String>,
    pub is_bot_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /rename` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_name: String,
    pub new_name: String,
}

/// `POST /delete` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub filename: String,
}

/// `{"success": true}` acknowledgement for file operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `{"status": "..."}` reply for start and stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_response_field_names() {
        let resp = DataResponse {
            files: vec!["index.js".into()],
            logs: vec![],
            is_bot_online: true,
            error: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["isBotOnline"], true);
        assert_eq!(json["files"][0], "index.js");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_rename_request_camel_case() {
        let req: RenameRequest =
            serde_json::from_str(r#"{"oldName":"a.js","newName":"index.js"}"#).unwrap();
        assert_eq!(req.old_name, "a.js");
        assert_eq!(req.new_name, "index.js");
    }
}
