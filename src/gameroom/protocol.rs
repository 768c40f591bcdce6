use super::*;

/// Wire codec between JSON text frames and room messages.
pub struct Protocol;

impl Protocol {
    /// Parses a client text frame.
    pub fn decode(s: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str::<ClientMessage>(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
    pub fn encode(message: &ServerMessage) -> String {
        message.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Vote;
    #[test]
    fn decode_client_messages() {
        assert_eq!(
            Protocol::decode(r#"{"type":"join","subject_id":"s-1"}"#),
            Ok(ClientMessage::Join {
                subject_id: "s-1".to_string(),
                session_id: None
            })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"comprehension_passed"}"#),
            Ok(ClientMessage::ComprehensionPassed)
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"choice_made","option":2,"timed_out":false,"reaction_time_ms":640}"#),
            Ok(ClientMessage::ChoiceMade {
                option: Some(2),
                timed_out: false,
                reaction_time_ms: Some(640)
            })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"choice_made","option":null,"timed_out":true}"#),
            Ok(ClientMessage::ChoiceMade {
                option: None,
                timed_out: true,
                reaction_time_ms: None
            })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"ostracism_vote","partner":3,"vote":"break"}"#),
            Ok(ClientMessage::OstracismVote {
                partner: 3,
                vote: Vote::Break
            })
        );
    }
    #[test]
    fn decode_malformed() {
        assert!(matches!(Protocol::decode("fold"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            Protocol::decode(r#"{"type":"teleport"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Protocol::decode(r#"{"type":"ostracism_vote","partner":1,"vote":"maybe"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }
    #[test]
    fn encode_server_messages() {
        let json = Protocol::encode(&ServerMessage::StageProgress {
            stage: Stage::ComprehensionTest,
            k: 1,
            n: 3,
        });
        let value = serde_json::from_str::<serde_json::Value>(&json).unwrap();
        assert_eq!(value["type"], "stage_progress");
        assert_eq!(value["stage"], "comprehension_test");
        assert_eq!(value["k"], 1);
        assert_eq!(value["n"], 3);
    }
    #[test]
    fn encode_rejection_carries_code() {
        let json = Protocol::encode(&ServerMessage::rejected(&ProtocolError::DuplicateChoice(2)));
        let value = serde_json::from_str::<serde_json::Value>(&json).unwrap();
        assert_eq!(value["type"], "rejected");
        assert_eq!(value["code"], "E105");
    }
}
