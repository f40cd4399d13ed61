//! Multipart payload behaviour: framing, readiness, lengths and the
//! piped producer's lifecycle.

use std::io::Write;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use courier::{Error, Multipart, Readiness};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::time::timeout;

const FOO_BAR: &str =
    "--testbound\r\nContent-Disposition: form-data; name=\"foo\"\r\n\r\nbar\r\n--testbound--\r\n";

fn foo_bar(multipart: Multipart) -> Multipart {
    multipart
        .with_boundary("testbound")
        .unwrap()
        .add_field("foo", "bar")
}

async fn read_string(form: &mut Multipart) -> courier::Result<String> {
    let mut out = String::new();
    form.read_to_string(&mut out).await?;
    Ok(out)
}

#[tokio::test]
async fn single_field_has_exact_framing() {
    for form in [Multipart::allocated(), Multipart::piped()] {
        let mut form = foo_bar(form);
        form.assemble().await.unwrap();
        assert_eq!(read_string(&mut form).await.unwrap(), FOO_BAR);
    }
}

#[tokio::test]
async fn second_assembly_is_rejected_and_payload_stays_ready() {
    let mut form = foo_bar(Multipart::allocated());
    form.assemble().await.unwrap();

    let err = form.assemble().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyAssembled));
    assert!(form.is_ready());
    assert_eq!(read_string(&mut form).await.unwrap(), FOO_BAR);
}

#[tokio::test]
async fn boundary_is_fixed_once_assembled() {
    let mut form = foo_bar(Multipart::piped());
    form.assemble().await.unwrap();
    assert!(matches!(
        form.with_boundary("other"),
        Err(Error::AlreadyAssembled)
    ));
}

#[test]
fn invalid_boundary_is_rejected() {
    assert!(matches!(
        Multipart::allocated().with_boundary("trailing "),
        Err(Error::InvalidBoundary(_))
    ));
    assert!(matches!(
        Multipart::allocated().with_boundary(""),
        Err(Error::InvalidBoundary(_))
    ));
}

#[tokio::test]
async fn read_before_assembly_fails_without_blocking() {
    let forms = [
        foo_bar(Multipart::allocated()),
        foo_bar(Multipart::piped()),
        {
            let mut tapped = foo_bar(Multipart::piped());
            tapped.tap(|_| Ok(()));
            tapped
        },
    ];

    for mut form in forms {
        assert_eq!(form.payload().readiness(), Readiness::Pending);
        let kind = form.payload().kind();
        let result = timeout(Duration::from_secs(1), read_string(&mut form))
            .await
            .unwrap_or_else(|_| panic!("{kind} read blocked before assembly"));
        assert!(
            matches!(result, Err(Error::NotReady { .. })),
            "{kind}: {result:?}"
        );
    }
}

#[tokio::test]
async fn allocated_length_tracks_remaining_bytes() {
    let mut form = foo_bar(Multipart::allocated());
    assert_eq!(form.len(), None);

    form.assemble().await.unwrap();
    assert_eq!(form.len(), Some(FOO_BAR.len() as u64));

    let mut head = [0u8; 10];
    form.read_exact(&mut head).await.unwrap();
    assert_eq!(form.len(), Some(FOO_BAR.len() as u64 - 10));

    read_string(&mut form).await.unwrap();
    assert_eq!(form.len(), Some(0));
}

#[tokio::test]
async fn piped_length_is_never_known() {
    let mut form = foo_bar(Multipart::piped());
    assert_eq!(form.len(), None);
    form.assemble().await.unwrap();
    assert_eq!(form.len(), None);
    read_string(&mut form).await.unwrap();
    assert_eq!(form.len(), None);
}

#[tokio::test]
async fn file_and_stream_parts_carry_filenames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"all green")
        .unwrap();

    let mut form = Multipart::allocated()
        .with_boundary("testbound")
        .unwrap()
        .add_file("file0", &path)
        .add_stream("log", "console.log", &b"started"[..]);
    assert_eq!(form.parts().len(), 2);
    form.assemble().await.unwrap();
    assert!(form.parts().is_empty());

    let expected = "--testbound\r\n\
        Content-Disposition: form-data; name=\"file0\"; filename=\"report.txt\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n\
        all green\r\n\
        --testbound\r\n\
        Content-Disposition: form-data; name=\"log\"; filename=\"console.log\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n\
        started\r\n\
        --testbound--\r\n";
    assert_eq!(read_string(&mut form).await.unwrap(), expected);
}

#[tokio::test]
async fn wiretap_sees_exactly_what_is_read() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let big = vec![b'z'; 40 * 1024];

    let mut form = Multipart::piped_with_capacity(512)
        .add_field("foo", "bar")
        .add_stream("blob", "blob.bin", std::io::Cursor::new(big));
    form.tap(move |chunk| {
        sink.lock().unwrap().extend_from_slice(chunk);
        Ok(())
    });
    assert_eq!(form.payload().kind(), "wiretap");

    form.assemble().await.unwrap();
    let mut returned = Vec::new();
    form.read_to_end(&mut returned).await.unwrap();

    assert!(returned.len() > 40 * 1024);
    assert_eq!(*observed.lock().unwrap(), returned);
}

#[tokio::test]
async fn wiretap_observer_error_fails_the_read() {
    let mut form = foo_bar(Multipart::allocated());
    form.tap(|_| Err("sink full".into()));
    form.assemble().await.unwrap();

    let mut out = Vec::new();
    let err = Error::from(form.read_to_end(&mut out).await.unwrap_err());
    assert!(matches!(err, Error::Tap(_)));
    assert!(out.is_empty());
}

#[tokio::test]
async fn piped_missing_file_surfaces_on_read_then_stays_failed() {
    let mut form = Multipart::piped()
        .add_field("foo", "bar")
        .add_file("file0", "/definitely/not/here.zip");
    form.assemble().await.unwrap();

    let err = read_string(&mut form).await.unwrap_err();
    match &err {
        Error::OpenPart { path, .. } => assert!(path.ends_with("here.zip")),
        other => panic!("unexpected error: {other:?}"),
    }

    let mut buf = [0u8; 8];
    let again = Error::from(form.read(&mut buf).await.unwrap_err());
    assert!(matches!(again, Error::AssemblyFailed));
}

#[tokio::test]
async fn allocated_missing_file_fails_assembly() {
    let mut form = Multipart::allocated().add_file("file0", "/definitely/not/here.zip");
    let err = form.assemble().await.unwrap_err();
    assert!(matches!(err, Error::OpenPart { .. }));
    assert!(!form.is_ready());
}

#[tokio::test]
async fn close_after_producer_finished_is_harmless() {
    let mut form = foo_bar(Multipart::piped());
    form.assemble().await.unwrap();

    // Small enough to fit the pipe, so the producer completes unread.
    form.wait().await.unwrap();
    form.close();
    form.wait().await.unwrap();

    let mut buf = [0u8; 8];
    let err = Error::from(form.read(&mut buf).await.unwrap_err());
    assert!(matches!(err, Error::PayloadClosed));
}

#[tokio::test]
async fn close_while_producer_writes_aborts_it() {
    let mut form = Multipart::piped_with_capacity(16).add_field("blob", "x".repeat(64 * 1024));
    form.assemble().await.unwrap();

    form.close();
    let err = timeout(Duration::from_secs(5), form.wait())
        .await
        .expect("producer did not stop after close")
        .unwrap_err();
    assert!(matches!(err, Error::AssemblyAborted));
}

#[tokio::test]
async fn wait_after_draining_a_form_larger_than_the_pipe() {
    let blob = "x".repeat(64 * 1024);
    let mut form = Multipart::piped_with_capacity(16).add_field("blob", blob.clone());
    form.assemble().await.unwrap();

    let mut out = Vec::new();
    form.read_to_end(&mut out).await.unwrap();
    timeout(Duration::from_secs(5), form.wait())
        .await
        .expect("producer did not finish after the body was drained")
        .unwrap();
    assert!(out.len() > blob.len());
}

struct DropFlag {
    content: &'static [u8],
    dropped: Arc<AtomicBool>,
}

impl AsyncRead for DropFlag {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.content).poll_read(cx, buf)
    }
}

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn stream_part_reader_is_dropped_after_rendering() {
    let dropped = Arc::new(AtomicBool::new(false));
    let reader = DropFlag {
        content: b"chunk",
        dropped: Arc::clone(&dropped),
    };

    let mut form = Multipart::allocated().add_stream("log", "console.log", reader);
    assert!(!dropped.load(Ordering::SeqCst));
    form.assemble().await.unwrap();
    assert!(dropped.load(Ordering::SeqCst));
}
