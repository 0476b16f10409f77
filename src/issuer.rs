use std::sync::Arc;
use std::time::Duration;

use crate::caller::{resolve_grant, CallerContext, TokenRequest};
use crate::signer::{CredentialSigner, SigningError, SigningRequest};

/// Lifetime of every issued credential.
pub const TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Signing failure: {0}")]
    SigningFailure(#[from] SigningError),
}

/// Mints room access tokens for platform-authenticated callers.
///
/// The issuer holds no per-call state, one instance is shared by every
/// invocation the process serves.
#[derive(Clone)]
pub struct TokenIssuer {
    signer: Arc<dyn CredentialSigner>,
}

impl TokenIssuer {
    pub fn new(signer: Arc<dyn CredentialSigner>) -> Self {
        Self { signer }
    }

    /// Issues a token granting `roomJoin` on the requested room.
    ///
    /// # Arguments
    ///
    /// * `caller` - Identity verified by the hosting platform, `None` falls back to guest values
    /// * `request` - Invocation payload
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed jwt
    /// * `Err(IssueError::SigningFailure)` - The keys are missing or signing failed
    pub fn issue(
        &self,
        caller: Option<&CallerContext>,
        request: &TokenRequest,
    ) -> Result<String, IssueError> {
        let grant = resolve_grant(caller, request);
        let signing_request = SigningRequest {
            identity: grant.identity,
            name: grant.name,
            ttl: TOKEN_TTL,
            room: grant.room,
        };

        match self.signer.sign(&signing_request) {
            Ok(token) => {
                log::info!(
                    "issue: identity: {}, room: {}",
                    signing_request.identity,
                    signing_request.room
                );
                Ok(token)
            }
            Err(e) => {
                log::error!(
                    "issue: failed to sign token for identity {}: {e}",
                    signing_request.identity
                );
                Err(IssueError::SigningFailure(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{LiveKitSigner, SigningKeys};
    use livekit_api::access_token::{Claims, TokenVerifier};
    use std::sync::Mutex;

    const API_KEY: &str = "APIissuerkey";
    const API_SECRET: &str = "issuer-secret-that-is-long-enough-for-hs256";

    fn issuer() -> TokenIssuer {
        let keys = SigningKeys {
            api_key: API_KEY.to_string(),
            api_secret: API_SECRET.to_string(),
        };
        TokenIssuer::new(Arc::new(LiveKitSigner::new(keys)))
    }

    fn decode(token: &str) -> Claims {
        TokenVerifier::with_api_key(API_KEY, API_SECRET)
            .verify(token)
            .unwrap()
    }

    /// Records signing requests instead of signing.
    #[derive(Default)]
    struct RecordingSigner {
        requests: Mutex<Vec<SigningRequest>>,
    }

    impl CredentialSigner for RecordingSigner {
        fn sign(&self, request: &SigningRequest) -> Result<String, SigningError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("signed".to_string())
        }
    }

    #[test]
    fn test_authenticated_caller_scenario() {
        let caller = CallerContext {
            email: Some("a@b.com".to_string()),
            uid: Some("u123".to_string()),
        };
        let token = issuer()
            .issue(Some(&caller), &TokenRequest::for_room("studio-1"))
            .unwrap();

        let claims = decode(&token);
        assert_eq!(claims.sub, "u123");
        assert_eq!(claims.name, "a@b.com");
        assert!(claims.video.room_join);
        assert_eq!(claims.video.room, "studio-1");
        assert_eq!(claims.exp - claims.nbf, 600);
    }

    #[test]
    fn test_absent_caller_scenario() {
        let token = issuer().issue(None, &TokenRequest::default()).unwrap();

        let claims = decode(&token);
        assert_eq!(claims.sub, "guest");
        assert_eq!(claims.name, "Guest");
        assert!(claims.video.room_join);
        assert_eq!(claims.video.room, "room");
        assert_eq!(claims.exp - claims.nbf, 600);
    }

    #[test]
    fn test_every_token_lives_ten_minutes() {
        let issuer = issuer();
        let callers = [
            None,
            Some(CallerContext {
                email: None,
                uid: Some("u1".to_string()),
            }),
            Some(CallerContext {
                email: Some("c@d.com".to_string()),
                uid: None,
            }),
        ];

        for caller in callers.iter() {
            let token = issuer
                .issue(caller.as_ref(), &TokenRequest::for_room(""))
                .unwrap();
            let claims = decode(&token);
            assert_eq!(claims.exp - claims.nbf, TOKEN_TTL.as_secs() as usize);
        }
    }

    #[test]
    fn test_unset_keys_fail_without_token() {
        let issuer = TokenIssuer::new(Arc::new(LiveKitSigner::unconfigured()));
        let caller = CallerContext {
            email: Some("a@b.com".to_string()),
            uid: Some("u123".to_string()),
        };

        let res = issuer.issue(Some(&caller), &TokenRequest::for_room("studio-1"));
        assert!(matches!(
            res,
            Err(IssueError::SigningFailure(SigningError::MissingKeys))
        ));
    }

    #[test]
    fn test_signer_receives_resolved_request() {
        let signer = Arc::new(RecordingSigner::default());
        let issuer = TokenIssuer::new(signer.clone());
        let caller = CallerContext {
            email: None,
            uid: Some("u9".to_string()),
        };

        let token = issuer
            .issue(Some(&caller), &TokenRequest::for_room("lobby"))
            .unwrap();
        assert_eq!(token, "signed");

        let requests = signer.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[SigningRequest {
                identity: "u9".to_string(),
                name: "Guest".to_string(),
                ttl: TOKEN_TTL,
                room: "lobby".to_string(),
            }]
        );
    }
}
