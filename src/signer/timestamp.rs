//! RFC 3161 timestamp client.

use super::asn1::{
    build_boolean, build_integer, build_octet_string, build_oid, build_sequence, DerReader, NULL,
};
use super::{DigestAlgorithm, TsaConfig};
use crate::error::{SignResult, TimestampError};

/// Obtains a timestamp token for `content` from the configured TSA.
/// Returns the raw token DER (a ContentInfo) from the response.
pub(crate) fn get_token(
    tsa: &TsaConfig,
    digest: DigestAlgorithm,
    content: &[u8],
) -> SignResult<Vec<u8>> {
    let request = build_request(digest, content);

    let client = reqwest::blocking::Client::builder()
        .timeout(tsa.timeout)
        .build()
        .map_err(|e| TimestampError::Transport(e.to_string()))?;

    let mut builder = client
        .post(&tsa.url)
        .header("Content-Type", "application/timestamp-query")
        .body(request);
    if !tsa.username.is_empty() && !tsa.password.is_empty() {
        builder = builder.basic_auth(&tsa.username, Some(&tsa.password));
    }

    let response = builder
        .send()
        .map_err(|e| TimestampError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TimestampError::Status {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let body = response
        .bytes()
        .map_err(|e| TimestampError::Transport(e.to_string()))?;
    parse_response(&body)
}

/// Builds a `TimeStampReq` with `certReq` set, asking the TSA to embed
/// its certificate in the token.
pub(crate) fn build_request(digest: DigestAlgorithm, content: &[u8]) -> Vec<u8> {
    let hash = digest.hash(content);

    let mut alg = build_oid(digest.oid());
    alg.extend_from_slice(NULL);

    let mut imprint = build_sequence(&alg);
    imprint.extend_from_slice(&build_octet_string(&hash));

    let mut req = build_integer(1);
    req.extend_from_slice(&build_sequence(&imprint));
    req.extend_from_slice(&build_boolean(true));
    build_sequence(&req)
}

/// Parses a `TimeStampResp`, checking the PKI status and extracting the
/// raw token.
pub(crate) fn parse_response(body: &[u8]) -> SignResult<Vec<u8>> {
    let malformed = |what: &str| TimestampError::Response(what.to_string());

    let mut reader = DerReader::new(body);
    let outer = reader
        .read_expect(0x30)
        .ok_or_else(|| malformed("not a TimeStampResp"))?;
    let mut fields = DerReader::new(outer.content);

    let status_info = fields
        .read_expect(0x30)
        .ok_or_else(|| malformed("missing status info"))?;
    let mut si = DerReader::new(status_info.content);
    let status = si
        .read_expect(0x02)
        .ok_or_else(|| malformed("missing status"))?;
    let code = status
        .content
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);

    // 0 = granted, 1 = grantedWithMods; anything else is a rejection.
    if code > 1 {
        return Err(TimestampError::Response(format!(
            "request rejected with status {}",
            code
        ))
        .into());
    }

    let token = fields
        .read()
        .ok_or_else(|| malformed("response carries no token"))?;
    Ok(token.raw.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_shape() {
        let der = build_request(DigestAlgorithm::Sha256, b"content");

        let mut reader = DerReader::new(&der);
        let req = reader.read_expect(0x30).unwrap();
        assert!(reader.is_empty());

        let mut fields = DerReader::new(req.content);
        let version = fields.read_expect(0x02).unwrap();
        assert_eq!(version.content, &[0x01]);

        let imprint = fields.read_expect(0x30).unwrap();
        let mut mi = DerReader::new(imprint.content);
        mi.read_expect(0x30).unwrap(); // AlgorithmIdentifier
        let hash = mi.read_expect(0x04).unwrap();
        assert_eq!(hash.content.len(), 32);

        let cert_req = fields.read_expect(0x01).unwrap();
        assert_eq!(cert_req.content, &[0xFF]);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_parse_response_granted() {
        // TimeStampResp { SEQ { INTEGER 0 }, token }
        let token = build_sequence(&build_integer(42));
        let mut content = build_sequence(&build_integer(0));
        content.extend_from_slice(&token);
        let response = build_sequence(&content);

        assert_eq!(parse_response(&response).unwrap(), token);
    }

    #[test]
    fn test_parse_response_rejected() {
        let response = build_sequence(&build_sequence(&build_integer(2)));
        assert!(parse_response(&response).is_err());
    }

    #[test]
    fn test_parse_response_missing_token() {
        let response = build_sequence(&build_sequence(&build_integer(0)));
        assert!(parse_response(&response).is_err());
    }
}
