//! Signer adapter: envelope in, `{r, s, v}` out.

use tracing::debug;

use crate::error::{SigningError, SigningResult};
use crate::signature::Signature;
use crate::typed_data::TypedDataEnvelope;
use crate::wallet::TypedDataSigner;

/// Ask the wallet to sign `envelope` and split the result.
///
/// No timeout and no retry: the wallet may wait on the user indefinitely,
/// and a decline ends the flow.
///
/// # Errors
/// - `SigningError::EncodingFailure` if the envelope's `types` is not a single entry
/// - `SigningError::SigningRejected` if the wallet declines, fails, or
///   returns something other than 65 bytes
pub async fn sign_envelope(
    wallet: &dyn TypedDataSigner,
    envelope: &TypedDataEnvelope,
) -> SigningResult<Signature> {
    let mut envelope = envelope.clone();
    envelope.prepare_for_signing()?;

    debug!(
        primary_type = %envelope.primary_type,
        chain_id = envelope.domain.chain_id,
        "requesting wallet signature"
    );

    let raw = wallet
        .sign_typed_data(&envelope.domain, &envelope.types, &envelope.message)
        .await?;

    if raw.len() != Signature::LEN {
        return Err(SigningError::SigningRejected(format!(
            "wallet returned a {}-byte signature",
            raw.len()
        )));
    }
    Signature::from_bytes(&raw)
}
