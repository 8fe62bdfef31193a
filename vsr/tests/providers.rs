mod common;

use common::Scripted;
use serde_json::json;
use std::error::Error as StdError;
use vsr::{
    Degradation, Error, Provider,
    providers::{
        Extract, Megacloud, Vidlink, Vidsrc,
        megacloud::{KEY_SOURCES, KeySource},
        vidlink,
    },
    resolve,
    transport::{REFERER, USER_AGENT, X_REQUESTED_WITH},
};
use vsr_cipher::{aes, b64, layered};

type TestResult = Result<(), Box<dyn StdError>>;

const VIDSRC_EMBED: &str = "https://vidsrc.to/embed/movie/550";
const VIDSRC_EMBED_PAGE: &str = r#"<html><body>
<iframe id="player_iframe" src="//cloudnestra.com/rcp/MjU1ZWQ0.aGFzaA" frameborder="0" scrolling="no" allowfullscreen></iframe>
</body></html>"#;
const VIDSRC_RCP_PAGE: &str = r#"<script>
    $('#pl_but').click(function(){ loadIframe(); });
    function loadIframe(data = 1) {
        $('#the_frame').removeAttr('style').html($('<iframe>').attr({ src:  '/prorcp/cHJvcmNwLWhhc2g' , frameborder: 0 }));
    }
</script>"#;

fn vidsrc(file: &str) -> Scripted {
    Scripted::new()
        .route(VIDSRC_EMBED, VIDSRC_EMBED_PAGE)
        .route("https://cloudnestra.com/rcp/MjU1ZWQ0.aGFzaA", VIDSRC_RCP_PAGE)
        .route(
            "https://cloudnestra.com/prorcp/cHJvcmNwLWhhc2g",
            format!(
                r#"<script>var player = new Playerjs({{id:"player_parent", file: "{}", cuid:"x"}});</script>"#,
                file
            ),
        )
}

#[test]
fn vidsrc_follows_iframe_chain() -> TestResult {
    let transport = vidsrc("https://tmstr.{v1}/pl/H4sI/master.m3u8 or https://tmstr2.{v2}/pl/H4sI/master.m3u8")
        .route(
            "https://vidsrc.to/ajax/embed/episode/MjU1ZWQ0.aGFzaA/subtitles",
            json!([
                {"file": "https://subs.example/en.vtt", "label": "English"},
                {"file": "https://subs.example/es.vtt", "label": "Spanish"},
                {"file": "https://subs.example/en2.vtt", "label": "ENG - SDH"},
            ])
            .to_string(),
        );

    let resolution = resolve(VIDSRC_EMBED, &transport)?;
    let stream = &resolution.stream;

    assert_eq!(stream.stream_url(), "https://tmstr.cloudnestra.com/pl/H4sI/master.m3u8");
    assert_eq!(stream.referer(), "https://cloudnestra.com/");
    assert_eq!(
        stream.subtitles().iter().map(|x| x.label.as_str()).collect::<Vec<_>>(),
        ["English", "ENG - SDH"]
    );
    assert!(!resolution.is_degraded());

    let rcp = transport.request("https://cloudnestra.com/rcp/MjU1ZWQ0.aGFzaA");
    assert_eq!(rcp.header_value(REFERER), Some(VIDSRC_EMBED));

    let prorcp = transport.request("https://cloudnestra.com/prorcp/cHJvcmNwLWhhc2g");
    assert_eq!(prorcp.header_value(REFERER), Some("https://cloudnestra.com/"));
    assert!(prorcp.header_value(USER_AGENT).is_some());

    let subtitles = transport.request("https://vidsrc.to/ajax/embed/episode/MjU1ZWQ0.aGFzaA/subtitles");
    assert_eq!(subtitles.header_value(X_REQUESTED_WITH), Some("XMLHttpRequest"));
    Ok(())
}

#[test]
fn vidsrc_without_subtitles_is_degraded() -> TestResult {
    let transport = vidsrc("https://tmstr.{v1}/pl/H4sI/master.m3u8");
    let resolution = Vidsrc.extract(VIDSRC_EMBED, &transport)?;

    assert_eq!(resolution.stream.stream_url(), "https://tmstr.cloudnestra.com/pl/H4sI/master.m3u8");
    assert!(resolution.stream.subtitles().is_empty());
    assert!(matches!(
        resolution.degradations[..],
        [Degradation::SubtitlesUnavailable { .. }]
    ));
    Ok(())
}

#[test]
fn vidsrc_rejects_non_manifest_file() {
    let transport = vidsrc("https://tmstr.{v1}/pl/H4sI/video.mp4");

    assert!(matches!(
        Vidsrc.extract(VIDSRC_EMBED, &transport),
        Err(Error::Unsupported(url)) if url == "https://tmstr.cloudnestra.com/pl/H4sI/video.mp4"
    ));
}

#[test]
fn vidsrc_missing_iframe() {
    let transport = Scripted::new().route(VIDSRC_EMBED, "<html><body>removed</body></html>");

    assert!(matches!(
        Vidsrc.extract(VIDSRC_EMBED, &transport),
        Err(Error::Extraction { what: "rcp iframe", .. })
    ));
    assert_eq!(transport.urls(), [VIDSRC_EMBED]);
}

const VIDLINK_EMBED: &str = "https://vidlink.pro/movie/550";
const VIDLINK_KEY: &str = "2de6e6ea13a9df9503b11a6117fd7e51941e04a0c223dfeacfe8a1dbb6c52783";

fn vidlink_api() -> Result<String, Box<dyn StdError>> {
    Ok(format!("https://vidlink.pro/api/b/movie/{}", vidlink::encode_id("550")?))
}

#[test]
fn vidlink_decrypts_api_answer() -> TestResult {
    let iv = [0x42u8; 16];
    let payload = r#"{"playlist":"https://storm.example/hls/550/playlist.m3u8","sources":[]}"#;
    let ciphertext = aes::encrypt_cbc(&hex::decode(VIDLINK_KEY)?, &iv, payload.as_bytes())?;
    let api = vidlink_api()?;

    let transport = Scripted::new()
        .route(&api, format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
        .route(
            "https://vidlink.pro/api/subtitles/550",
            json!([
                {"url": "https://subs.example/550/en.vtt", "label": "English"},
                {"url": "https://subs.example/550/fr.vtt", "label": "French"},
            ])
            .to_string(),
        );

    let resolution = Vidlink.extract(VIDLINK_EMBED, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://storm.example/hls/550/playlist.m3u8"
    );
    assert_eq!(resolution.stream.referer(), "https://vidlink.pro/");
    assert_eq!(resolution.stream.subtitles().len(), 1);
    assert_eq!(resolution.stream.subtitles()[0].file, "https://subs.example/550/en.vtt");
    assert!(!resolution.is_degraded());
    assert_eq!(transport.request(&api).header_value(REFERER), Some(VIDLINK_EMBED));
    Ok(())
}

#[test]
fn vidlink_falls_back_to_page_scan() -> TestResult {
    let transport = Scripted::new()
        .route_status(vidlink_api()?, 503, "<html>maintenance</html>")
        .route(
            VIDLINK_EMBED,
            r#"<script>jwplayer("v").setup({ file: "https://backup.example/550/index.m3u8" });</script>"#,
        );

    let resolution = Vidlink.extract(VIDLINK_EMBED, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://backup.example/550/index.m3u8"
    );
    assert_eq!(resolution.stream.referer(), "https://vidlink.pro/");
    assert!(matches!(
        &resolution.degradations[0],
        Degradation::FellBack { from: Provider::EncryptedApi, to: Provider::Generic, .. }
    ));
    assert!(matches!(
        resolution.degradations[1..],
        [Degradation::SubtitlesUnavailable { .. }]
    ));
    Ok(())
}

#[test]
fn vidlink_json_error_body_falls_back() -> TestResult {
    let transport = Scripted::new()
        .route(vidlink_api()?, r#"{"error":"rate limited"}"#)
        .route(
            VIDLINK_EMBED,
            r#"<script>jwplayer("v").setup({ file: "https://backup.example/550/index.m3u8" });</script>"#,
        );

    let resolution = Vidlink.extract(VIDLINK_EMBED, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://backup.example/550/index.m3u8"
    );
    assert!(matches!(
        &resolution.degradations[0],
        Degradation::FellBack { from: Provider::EncryptedApi, to: Provider::Generic, .. }
    ));
    Ok(())
}

#[test]
fn vidlink_rejects_non_manifest_playlist() -> TestResult {
    let iv = [9u8; 16];
    let payload = r#"{"playlist":"https://storm.example/550/movie.mp4"}"#;
    let ciphertext = aes::encrypt_cbc(&hex::decode(VIDLINK_KEY)?, &iv, payload.as_bytes())?;
    let transport = Scripted::new().route(
        vidlink_api()?,
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)),
    );

    assert!(matches!(
        Vidlink.extract(VIDLINK_EMBED, &transport),
        Err(Error::Unsupported(url)) if url == "https://storm.example/550/movie.mp4"
    ));
    Ok(())
}

#[test]
fn vidlink_garbage_payload_is_decryption_error() -> TestResult {
    let iv = [1u8; 16];
    let ciphertext = aes::encrypt_cbc(&hex::decode(VIDLINK_KEY)?, &iv, b"not json at all")?;
    let transport = Scripted::new().route(
        vidlink_api()?,
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)),
    );

    assert!(matches!(
        Vidlink.extract(VIDLINK_EMBED, &transport),
        Err(Error::Decryption(_))
    ));
    Ok(())
}

const MEGACLOUD_EMBED: &str = "https://megacloud.blog/embed-2/v3/e-1/Zx81bTq0?k=1";
const MEGACLOUD_API: &str = "https://megacloud.blog/embed-1/v3/e-1/getSources?id=Zx81bTq0&_k=Xk29fPqL0zVw7RtY";
const MEGACLOUD_KEY: &str = "a9f3c1d7e2b84f6a0c5d9e1f2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d";
const CLIENT_KEY: &str = "Xk29fPqL0zVw7RtY";

fn key_source_urls() -> (&'static str, &'static str) {
    match KEY_SOURCES {
        [KeySource::Json(json), KeySource::Text(text)] => (json, text),
        _ => panic!("unexpected key source order"),
    }
}

fn megacloud_page() -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta name="_gg_fb" content="{}"></head><body></body></html>"#,
        CLIENT_KEY
    )
}

#[test]
fn megacloud_decrypts_layered_sources() -> TestResult {
    let (json_source, text_source) = key_source_urls();
    let sources = layered::encrypt_sources(
        r#"[{"file":"https://cdn.example/hls/master.m3u8","type":"hls"}]"#,
        CLIENT_KEY,
        MEGACLOUD_KEY,
    )?;

    let transport = Scripted::new()
        .route(MEGACLOUD_EMBED, megacloud_page())
        .route_status(json_source, 404, "404: Not Found")
        .route(text_source, format!("{}\n", MEGACLOUD_KEY))
        .route(
            MEGACLOUD_API,
            json!({
                "sources": sources,
                "encrypted": true,
                "tracks": [
                    {"file": "https://subs.example/eng.vtt", "kind": "captions", "label": "English"},
                    {"file": "https://subs.example/thumbs.vtt", "kind": "thumbnails", "label": "English"},
                    {"file": "https://subs.example/ita.vtt", "kind": "captions", "label": "Italian"},
                ],
            })
            .to_string(),
        );

    let resolution = Megacloud.extract(MEGACLOUD_EMBED, &transport)?;
    let stream = &resolution.stream;

    assert_eq!(stream.stream_url(), "https://cdn.example/hls/master.m3u8");
    assert_eq!(stream.referer(), "https://megacloud.blog/");
    assert_eq!(stream.subtitles().len(), 1);
    assert_eq!(stream.subtitles()[0].file, "https://subs.example/eng.vtt");

    let api = transport.request(MEGACLOUD_API);
    assert_eq!(api.header_value(REFERER), Some(MEGACLOUD_EMBED));
    assert_eq!(api.header_value(X_REQUESTED_WITH), Some("XMLHttpRequest"));
    Ok(())
}

#[test]
fn megacloud_plain_sources() -> TestResult {
    let (json_source, _) = key_source_urls();
    let transport = Scripted::new()
        .route(MEGACLOUD_EMBED, megacloud_page())
        .route(json_source, json!({"mega": MEGACLOUD_KEY}).to_string())
        .route(
            MEGACLOUD_API,
            json!({
                "sources": [{"file": "https://cdn.example/plain/master.m3u8", "type": "hls"}],
                "encrypted": false,
                "tracks": [],
            })
            .to_string(),
        );

    let resolution = Megacloud.extract(MEGACLOUD_EMBED, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://cdn.example/plain/master.m3u8"
    );
    Ok(())
}

#[test]
fn megacloud_accepts_openssl_envelope() -> TestResult {
    let (json_source, _) = key_source_urls();
    let transport = Scripted::new()
        .route(MEGACLOUD_EMBED, megacloud_page())
        .route(json_source, json!({"mega": "sharedKey"}).to_string())
        .route(
            MEGACLOUD_API,
            json!({
                "sources": "U2FsdGVkX18BAgMEBQYHCNgyTboCUQxsCrbsgGSZ6g+3fVN8RvGtWrlOBfAa4/BKXF5xZCKWkycepVqya8vx8n9QqI9ctlb0jRyVHV1McBo=",
                "encrypted": true,
            })
            .to_string(),
        );

    let resolution = Megacloud.extract(MEGACLOUD_EMBED, &transport)?;

    assert_eq!(resolution.stream.stream_url(), "https://cdn.example/hls/master.m3u8");
    assert!(resolution.stream.subtitles().is_empty());
    Ok(())
}

#[test]
fn megacloud_needs_a_shared_key() {
    let (_, text_source) = key_source_urls();
    let transport = Scripted::new().route(MEGACLOUD_EMBED, megacloud_page());

    assert!(matches!(
        Megacloud.extract(MEGACLOUD_EMBED, &transport),
        Err(Error::Transport { url, .. }) if url == text_source
    ));
    assert!(!transport.urls().iter().any(|x| x.contains("getSources")));
}

#[test]
fn megacloud_missing_client_key() {
    let transport = Scripted::new().route(MEGACLOUD_EMBED, "<html><body>nothing</body></html>");

    assert!(matches!(
        Megacloud.extract(MEGACLOUD_EMBED, &transport),
        Err(Error::Extraction { what: "client key", .. })
    ));
}

/// Hides `server_hash` the way embed.su pages do.
fn embedsu_hash(server_hash: &str) -> String {
    let inner = b64::encode(server_hash);
    let (a, b) = inner.split_at(inner.len() / 2);
    let a = a.chars().rev().collect::<String>();
    let b = b.chars().rev().collect::<String>();
    format!("{}.{}", b64::encode(a), b64::encode(b))
}

#[test]
fn embedsu_unwraps_hash() -> TestResult {
    let embed_url = "https://embed.su/embed/movie/550";
    let config = b64::encode(json!({"title": "Fight Club", "hash": embedsu_hash("x7Kq2.cdn1.tail")}).to_string());

    let transport = Scripted::new()
        .route(
            embed_url,
            format!(r#"<script>window.vConfig = JSON.parse(atob("{}"));</script>"#, config),
        )
        .route(
            "https://embed.su/api/e/x7Kq2",
            json!({
                "source": "https://hls.example/550/master.m3u8",
                "subtitles": [
                    {"file": "https://subs.example/550-en.vtt", "label": "English"},
                    {"file": "https://subs.example/550-de.vtt", "label": "German"},
                ],
            })
            .to_string(),
        );

    let resolution = resolve(embed_url, &transport)?;

    assert_eq!(resolution.stream.stream_url(), "https://hls.example/550/master.m3u8");
    assert_eq!(resolution.stream.referer(), "https://embed.su/");
    assert_eq!(resolution.stream.subtitles().len(), 1);
    assert_eq!(
        transport.request("https://embed.su/api/e/x7Kq2").header_value(REFERER),
        Some(embed_url)
    );
    Ok(())
}

#[test]
fn embedsu_rejects_non_manifest_source() {
    let embed_url = "https://embed.su/embed/movie/551";
    let config = b64::encode(json!({"hash": embedsu_hash("q9Wm4.cdn2")}).to_string());

    let transport = Scripted::new()
        .route(
            embed_url,
            format!(r#"<script>window.vConfig = JSON.parse(atob("{}"));</script>"#, config),
        )
        .route(
            "https://embed.su/api/e/q9Wm4",
            json!({"source": "https://files.example/551.mp4", "subtitles": []}).to_string(),
        );

    assert!(matches!(
        resolve(embed_url, &transport),
        Err(Error::Unsupported(url)) if url == "https://files.example/551.mp4"
    ));
}

/// Packs `text` into a hunter style payload.
fn hunter_pack(text: &str, alphabet: &str, offset: i64, base: i64, separator: char) -> String {
    let digits = alphabet.chars().collect::<Vec<_>>();

    text.chars()
        .map(|x| {
            let mut value = x as i64 + offset;
            let mut token = Vec::new();

            while value > 0 {
                token.push(digits[(value % base) as usize]);
                value /= base;
            }

            token.iter().rev().collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

#[test]
fn multiembed_unpacks_player_script() -> TestResult {
    let embed_url = "https://multiembed.mov/?video_id=550&tmdb=1";
    let script = r##"var player = new Clappr.Player({ source: "/hls/550/index.m3u8", parentId: "#player" });"##;
    let page = format!(
        r#"<html><script>var decoy = "https://ads.example/preroll.m3u8";</script><script>eval(function(h,u,n,t,e,r){{r="";for(var i=0,len=h.length;i<len;i++){{}}return decodeURIComponent(escape(r))}}("{}",122,"abcdefg",23,7,12))</script></html>"#,
        hunter_pack(script, "abcdefg", 23, 7, 'z')
    );

    let transport = Scripted::new().route(embed_url, page);
    let resolution = resolve(embed_url, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://multiembed.mov/hls/550/index.m3u8"
    );
    assert_eq!(resolution.stream.referer(), "https://multiembed.mov/");
    assert_eq!(
        transport.request(embed_url).header_value(REFERER),
        Some("https://multiembed.mov/")
    );
    Ok(())
}

#[test]
fn generic_scans_unknown_hosts() -> TestResult {
    let embed_url = "https://player.example/e/abc";
    let transport = Scripted::new().route(
        embed_url,
        r#"<script>const poster = "https://img.example/a.jpg"; setup({ src: '/streams/abc/master.m3u8' });</script>"#,
    );

    let resolution = resolve(embed_url, &transport)?;

    assert_eq!(
        resolution.stream.stream_url(),
        "https://player.example/streams/abc/master.m3u8"
    );
    assert_eq!(resolution.stream.referer(), "https://player.example/");
    Ok(())
}

#[test]
fn generic_reports_missing_manifest() {
    let embed_url = "https://player.example/e/none";
    let transport = Scripted::new().route(embed_url, "<video src='/a.mp4'></video>");

    assert!(matches!(
        resolve(embed_url, &transport),
        Err(Error::Extraction { provider: "generic", .. })
    ));
}

#[test]
fn status_errors_surface() {
    let embed_url = "https://player.example/e/gone";
    let transport = Scripted::new().route_status(embed_url, 404, "not found");

    assert!(matches!(
        resolve(embed_url, &transport),
        Err(Error::Status { status: 404, .. })
    ));
}
