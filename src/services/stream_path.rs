// StreamPath Codec
// Encodes typed stream endpoints into the engine's path strings and back
//
// NTRIP client grammar:
//   path        := [credentials] host ":" port ["/" mountpoint] ["#" str2]
//   credentials := user [":" password] "@"
//
// Nothing is escaped, so encode refuses fields that would split differently:
//   host        no ':', '@', '/' or '#'
//   port        ASCII digits only
//   user        no '@', ':', '/' or '#'
//   password    no '@', '/' or '#'
//   mountpoint  no '#'
// A mountpoint may hold '@' or '/', and str2 may hold anything.

use crate::models::{NtripEndpoint, StreamEndpoint, StreamType, UnknownStreamType};

/// Errors raised by the path codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamPathError {
    #[error("Malformed {stream_type} endpoint: {reason}")]
    MalformedEndpoint {
        stream_type: StreamType,
        reason: String,
    },

    #[error("Unsupported stream type: {0}")]
    UnsupportedStreamType(String),
}

impl StreamPathError {
    fn malformed(stream_type: StreamType, reason: impl Into<String>) -> Self {
        StreamPathError::MalformedEndpoint {
            stream_type,
            reason: reason.into(),
        }
    }

    fn unsupported(stream_type: StreamType) -> Self {
        StreamPathError::UnsupportedStreamType(stream_type.name().to_string())
    }
}

impl From<UnknownStreamType> for StreamPathError {
    fn from(err: UnknownStreamType) -> Self {
        StreamPathError::UnsupportedStreamType(err.0)
    }
}

/// Stateless codec between `StreamEndpoint` and engine path strings
pub struct StreamPathCodec;

impl StreamPathCodec {
    /// Encode an endpoint into the path string for `stream_type`.
    /// The endpoint variant must match the type; `NONE` always encodes to "".
    pub fn encode(stream_type: StreamType, endpoint: &StreamEndpoint) -> Result<String, StreamPathError> {
        match (stream_type, endpoint) {
            (StreamType::None, _) => Ok(String::new()),
            (StreamType::File, StreamEndpoint::File { path }) => Ok(path.clone()),
            (StreamType::TcpCli, StreamEndpoint::TcpCli { host, port }) => {
                require_host_port(stream_type, host, port)?;
                Ok(format!("{host}:{port}"))
            }
            (StreamType::NtripCli, StreamEndpoint::NtripCli(ntrip)) => encode_ntrip(ntrip),
            (t, _) if !t.is_codec_supported() => Err(StreamPathError::unsupported(t)),
            (t, other) => Err(StreamPathError::malformed(
                t,
                format!("endpoint is a {} endpoint", other.stream_type()),
            )),
        }
    }

    /// Decode a path string produced by `encode` for the same type
    pub fn decode(stream_type: StreamType, path: &str) -> Result<StreamEndpoint, StreamPathError> {
        match stream_type {
            StreamType::None => Ok(StreamEndpoint::None),
            StreamType::File => Ok(StreamEndpoint::file(path)),
            StreamType::TcpCli => {
                let (host, port) = split_host_port(stream_type, path)?;
                Ok(StreamEndpoint::tcp_client(host, port))
            }
            StreamType::NtripCli => decode_ntrip(path).map(StreamEndpoint::NtripCli),
            other => Err(StreamPathError::unsupported(other)),
        }
    }

    /// Short label such as "tcp:localhost:1020". Never fails.
    pub fn summarize(stream_type: StreamType, path: &str) -> String {
        if stream_type == StreamType::None {
            return String::new();
        }

        let tag = stream_type.summary_tag();
        if !stream_type.is_codec_supported() {
            return format!("{tag}:{path}");
        }

        match Self::decode(stream_type, path).and_then(|endpoint| Self::encode(stream_type, &endpoint)) {
            Ok(canonical) => format!("{tag}:{canonical}"),
            Err(e) => {
                log::debug!("Summary falls back to raw {stream_type} path: {e}");
                format!("{tag}:{path}")
            }
        }
    }

    /// Convenience for callers holding a persisted type name
    pub fn decode_named(type_name: &str, path: &str) -> Result<StreamEndpoint, StreamPathError> {
        let stream_type: StreamType = type_name.parse()?;
        Self::decode(stream_type, path)
    }
}

fn require_host_port(stream_type: StreamType, host: &str, port: &str) -> Result<(), StreamPathError> {
    if host.is_empty() {
        return Err(StreamPathError::malformed(stream_type, "missing host"));
    }
    if port.is_empty() {
        return Err(StreamPathError::malformed(stream_type, "missing port"));
    }
    reject_delimiters(stream_type, "host", host, &[':', '@', '/', '#'])?;
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamPathError::malformed(
            stream_type,
            format!("port '{port}' is not numeric"),
        ));
    }
    Ok(())
}

fn reject_delimiters(
    stream_type: StreamType,
    field: &str,
    value: &str,
    delimiters: &[char],
) -> Result<(), StreamPathError> {
    match value.chars().find(|c| delimiters.contains(c)) {
        Some(c) => Err(StreamPathError::malformed(
            stream_type,
            format!("{field} '{value}' contains '{c}'"),
        )),
        None => Ok(()),
    }
}

fn split_host_port(stream_type: StreamType, segment: &str) -> Result<(String, String), StreamPathError> {
    let (host, port) = segment
        .split_once(':')
        .ok_or_else(|| StreamPathError::malformed(stream_type, format!("no host:port in '{segment}'")))?;
    require_host_port(stream_type, host, port)?;
    Ok((host.to_string(), port.to_string()))
}

fn encode_ntrip(ntrip: &NtripEndpoint) -> Result<String, StreamPathError> {
    let ntrip_type = StreamType::NtripCli;
    require_host_port(ntrip_type, &ntrip.host, &ntrip.port)?;

    let mut path = String::new();

    if let Some(user) = present(&ntrip.user) {
        reject_delimiters(ntrip_type, "user", user, &['@', ':', '/', '#'])?;
        path.push_str(user);
        if let Some(password) = present(&ntrip.password) {
            reject_delimiters(ntrip_type, "password", password, &['@', '/', '#'])?;
            path.push(':');
            path.push_str(password);
        }
        path.push('@');
    } else if present(&ntrip.password).is_some() {
        log::debug!("NTRIP password without user is not encoded");
    }

    path.push_str(&ntrip.host);
    path.push(':');
    path.push_str(&ntrip.port);

    if let Some(mountpoint) = present(&ntrip.mountpoint) {
        reject_delimiters(ntrip_type, "mountpoint", mountpoint, &['#'])?;
        path.push('/');
        path.push_str(mountpoint);
    }
    if let Some(str2) = present(&ntrip.str2) {
        path.push('#');
        path.push_str(str2);
    }

    Ok(path)
}

fn decode_ntrip(path: &str) -> Result<NtripEndpoint, StreamPathError> {
    let is_tail_delimiter = |c: char| c == '/' || c == '#';

    // Credentials end at the last '@' ahead of the mountpoint/str2 tail
    let head_end = path.find(is_tail_delimiter).unwrap_or(path.len());
    let (credentials, rest) = match path[..head_end].rfind('@') {
        Some(at) => (Some(&path[..at]), &path[at + 1..]),
        None => (None, path),
    };

    let tail_start = rest.find(is_tail_delimiter).unwrap_or(rest.len());
    let (host, port) = split_host_port(StreamType::NtripCli, &rest[..tail_start])?;
    let tail = &rest[tail_start..];

    let (mountpoint, str2) = if let Some(body) = tail.strip_prefix('/') {
        match body.split_once('#') {
            Some((mountpoint, str2)) => (mountpoint, str2),
            None => (body, ""),
        }
    } else if let Some(str2) = tail.strip_prefix('#') {
        ("", str2)
    } else {
        ("", "")
    };

    let (user, password) = match credentials {
        Some(creds) => creds.split_once(':').unwrap_or((creds, "")),
        None => ("", ""),
    };

    Ok(NtripEndpoint::new(user, password, &host, &port, mountpoint, str2))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ntrip(user: &str, password: &str, mountpoint: &str, str2: &str) -> StreamEndpoint {
        StreamEndpoint::NtripCli(NtripEndpoint::new(
            user,
            password,
            "rtk.example.com",
            "2101",
            mountpoint,
            str2,
        ))
    }

    #[test]
    fn test_tcp_client_host_port() {
        let endpoint = StreamEndpoint::tcp_client("localhost", "1020");
        let path = StreamPathCodec::encode(StreamType::TcpCli, &endpoint).unwrap();
        assert_eq!(path, "localhost:1020");
        assert_eq!(StreamPathCodec::decode(StreamType::TcpCli, &path).unwrap(), endpoint);
    }

    #[test]
    fn test_ntrip_with_credentials_and_mountpoint() {
        let path = StreamPathCodec::encode(StreamType::NtripCli, &ntrip("bob", "pw", "MOUNT1", "")).unwrap();
        assert_eq!(path, "bob:pw@rtk.example.com:2101/MOUNT1");
    }

    #[test]
    fn test_ntrip_bare_host_port() {
        let decoded = StreamPathCodec::decode(StreamType::NtripCli, "rtk.example.com:2101").unwrap();
        assert_eq!(decoded, ntrip("", "", "", ""));

        let encoded = StreamPathCodec::encode(StreamType::NtripCli, &decoded).unwrap();
        assert_eq!(encoded, "rtk.example.com:2101");
    }

    #[test]
    fn test_ntrip_omits_delimiters_of_absent_fields() {
        let cases = [
            (ntrip("bob", "", "", ""), "bob@rtk.example.com:2101"),
            (ntrip("", "", "MNT", ""), "rtk.example.com:2101/MNT"),
            (ntrip("", "", "", "extra"), "rtk.example.com:2101#extra"),
            (ntrip("bob", "pw", "MNT", "extra"), "bob:pw@rtk.example.com:2101/MNT#extra"),
        ];
        for (endpoint, expected) in cases {
            let encoded = StreamPathCodec::encode(StreamType::NtripCli, &endpoint).unwrap();
            assert_eq!(encoded, expected);
            assert_eq!(StreamPathCodec::decode(StreamType::NtripCli, &encoded).unwrap(), endpoint);
        }
    }

    #[test]
    fn test_ntrip_every_optional_field_combination_round_trips() {
        let pick = |mask: u8, bit: u8, value: &'static str| if mask & bit != 0 { value } else { "" };

        for mask in 0u8..16 {
            let user = pick(mask, 1, "bob");
            let password = pick(mask, 2, "p:w");
            let mountpoint = pick(mask, 4, "MNT/1@x");
            let str2 = pick(mask, 8, "a/b#c@d");
            let original = NtripEndpoint::new(user, password, "caster", "2101", mountpoint, str2);

            let encoded = StreamPathCodec::encode(StreamType::NtripCli, &StreamEndpoint::NtripCli(original.clone()))
                .unwrap();
            let StreamEndpoint::NtripCli(decoded) = StreamPathCodec::decode(StreamType::NtripCli, &encoded).unwrap()
            else {
                panic!("expected ntrip endpoint for '{encoded}'");
            };

            let password_without_user = user.is_empty() && !password.is_empty();
            if password_without_user {
                assert_eq!(decoded.password, None, "mask {mask}");
                assert_eq!(
                    decoded,
                    NtripEndpoint { password: None, ..original.normalized() },
                    "mask {mask}"
                );
            } else {
                assert_eq!(decoded, original.normalized(), "mask {mask} via '{encoded}'");
            }
        }
    }

    #[test]
    fn test_encode_rejects_fields_that_would_not_round_trip() {
        let tcp = |host: &str, port: &str| StreamEndpoint::tcp_client(host, port);
        let caster = |user: &str, password: &str, port: &str, mountpoint: &str| {
            StreamEndpoint::NtripCli(NtripEndpoint::new(user, password, "caster", port, mountpoint, ""))
        };

        let rejected = [
            (StreamType::TcpCli, tcp("a:b", "1020")),
            (StreamType::TcpCli, tcp("user@box", "1020")),
            (StreamType::TcpCli, tcp("box/1", "1020")),
            (StreamType::TcpCli, tcp("localhost", "10#20")),
            (StreamType::TcpCli, tcp("localhost", "1020:1")),
            (StreamType::TcpCli, tcp("localhost", "port")),
            (StreamType::NtripCli, caster("", "", "2101/evil", "")),
            (StreamType::NtripCli, caster("", "", "2101", "M#x")),
            (StreamType::NtripCli, caster("b@b", "", "2101", "")),
            (StreamType::NtripCli, caster("b:b", "", "2101", "")),
            (StreamType::NtripCli, caster("bob", "p@w", "2101", "")),
            (StreamType::NtripCli, caster("bob", "p/w", "2101", "")),
            (StreamType::NtripCli, caster("bob", "p#w", "2101", "")),
        ];
        for (stream_type, endpoint) in rejected {
            let err = StreamPathCodec::encode(stream_type, &endpoint).unwrap_err();
            assert!(
                matches!(err, StreamPathError::MalformedEndpoint { .. }),
                "{endpoint:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_numeric_port() {
        for (stream_type, path) in [
            (StreamType::TcpCli, "a:b:1020"),
            (StreamType::NtripCli, "caster:21o1/MNT"),
        ] {
            let err = StreamPathCodec::decode(stream_type, path).unwrap_err();
            assert!(matches!(err, StreamPathError::MalformedEndpoint { .. }), "{path} gave {err:?}");
        }
    }

    #[test]
    fn test_ntrip_str2_may_contain_slash() {
        let endpoint = ntrip("", "", "", "a/b");
        let encoded = StreamPathCodec::encode(StreamType::NtripCli, &endpoint).unwrap();
        assert_eq!(encoded, "rtk.example.com:2101#a/b");
        assert_eq!(StreamPathCodec::decode(StreamType::NtripCli, &encoded).unwrap(), endpoint);
    }

    #[test]
    fn test_ntrip_mountpoint_may_contain_at_sign() {
        let decoded = StreamPathCodec::decode(StreamType::NtripCli, "u@caster:2101/M@1").unwrap();
        let StreamEndpoint::NtripCli(ntrip) = decoded else {
            panic!("expected ntrip endpoint");
        };
        assert_eq!(ntrip.user.as_deref(), Some("u"));
        assert_eq!(ntrip.host, "caster");
        assert_eq!(ntrip.mountpoint.as_deref(), Some("M@1"));
    }

    #[test]
    fn test_explicit_empty_optionals_round_trip_as_absent() {
        let endpoint = StreamEndpoint::NtripCli(NtripEndpoint {
            user: Some(String::new()),
            password: None,
            host: "caster".to_string(),
            port: "2101".to_string(),
            mountpoint: Some(String::new()),
            str2: Some(String::new()),
        });
        let encoded = StreamPathCodec::encode(StreamType::NtripCli, &endpoint).unwrap();
        assert_eq!(encoded, "caster:2101");

        let StreamEndpoint::NtripCli(original) = endpoint else { unreachable!() };
        assert_eq!(
            StreamPathCodec::decode(StreamType::NtripCli, &encoded).unwrap(),
            StreamEndpoint::NtripCli(original.normalized())
        );
    }

    #[test]
    fn test_file_path_is_verbatim() {
        let endpoint = StreamEndpoint::file("/sdcard/RtkGps/solution_%Y%m%d.pos");
        let encoded = StreamPathCodec::encode(StreamType::File, &endpoint).unwrap();
        assert_eq!(encoded, "/sdcard/RtkGps/solution_%Y%m%d.pos");
        assert_eq!(StreamPathCodec::decode(StreamType::File, &encoded).unwrap(), endpoint);
    }

    #[test]
    fn test_none_decodes_to_empty_endpoint() {
        for input in ["", "garbage", "host:port", "@@::/#"] {
            assert_eq!(StreamPathCodec::decode(StreamType::None, input).unwrap(), StreamEndpoint::None);
        }
        let encoded = StreamPathCodec::encode(StreamType::None, &StreamEndpoint::file("x")).unwrap();
        assert_eq!(encoded, "");
    }

    #[test]
    fn test_malformed_host_segments() {
        for (stream_type, path) in [
            (StreamType::TcpCli, ""),
            (StreamType::TcpCli, "localhost"),
            (StreamType::TcpCli, ":1020"),
            (StreamType::TcpCli, "localhost:"),
            (StreamType::NtripCli, ""),
            (StreamType::NtripCli, "user:pw@"),
            (StreamType::NtripCli, "user@:2101/MNT"),
        ] {
            let err = StreamPathCodec::decode(stream_type, path).unwrap_err();
            assert!(
                matches!(err, StreamPathError::MalformedEndpoint { .. }),
                "{stream_type} '{path}' gave {err:?}"
            );
        }
    }

    #[test]
    fn test_encode_rejects_mismatched_endpoint() {
        let err = StreamPathCodec::encode(StreamType::TcpCli, &StreamEndpoint::file("/tmp/x")).unwrap_err();
        assert!(matches!(err, StreamPathError::MalformedEndpoint { stream_type: StreamType::TcpCli, .. }));

        let err = StreamPathCodec::encode(StreamType::TcpCli, &StreamEndpoint::tcp_client("", "1020")).unwrap_err();
        assert!(err.to_string().contains("missing host"));
    }

    #[test]
    fn test_unsupported_types() {
        let err = StreamPathCodec::decode(StreamType::Serial, "ttyUSB0:115200").unwrap_err();
        assert_eq!(err, StreamPathError::UnsupportedStreamType("SERIAL".to_string()));

        let err = StreamPathCodec::encode(StreamType::Ftp, &StreamEndpoint::None).unwrap_err();
        assert_eq!(err, StreamPathError::UnsupportedStreamType("FTP".to_string()));

        let err = StreamPathCodec::decode_named("UDP", "x").unwrap_err();
        assert_eq!(err, StreamPathError::UnsupportedStreamType("UDP".to_string()));
    }

    #[test]
    fn test_summaries() {
        assert_eq!(StreamPathCodec::summarize(StreamType::File, "/sdcard/log.txt"), "file:/sdcard/log.txt");
        assert_eq!(StreamPathCodec::summarize(StreamType::TcpCli, "localhost:1020"), "tcp:localhost:1020");
        assert_eq!(
            StreamPathCodec::summarize(StreamType::NtripCli, "bob:pw@caster:2101/MNT"),
            "ntrip:bob:pw@caster:2101/MNT"
        );
        assert_eq!(StreamPathCodec::summarize(StreamType::None, "ignored"), "");
    }

    #[test]
    fn test_summary_falls_back_to_raw_path() {
        assert_eq!(StreamPathCodec::summarize(StreamType::TcpCli, ""), "tcp:");
        assert_eq!(StreamPathCodec::summarize(StreamType::NtripCli, "no-port"), "ntrip:no-port");
        assert_eq!(StreamPathCodec::summarize(StreamType::Serial, "ttyUSB0"), "serial:ttyUSB0");
    }
}
