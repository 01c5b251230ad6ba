use super::*;

use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
    }
}

fn frame(width: u32, height: u32, shade: u8) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: [shade, shade, shade, 255].repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn scratch(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit_encode_zip")
        .join(name)
}

#[test]
fn member_names_are_zero_padded() {
    assert_eq!(frame_file_name(FrameIndex(0)), "frame_00000.png");
    assert_eq!(frame_file_name(FrameIndex(123)), "frame_00123.png");
}

#[test]
fn in_memory_archive_holds_frames_in_order() {
    let mut sink = ZipSink::in_memory();
    sink.begin(cfg(4, 2)).unwrap();
    for i in 0..3u8 {
        sink.push_frame(FrameIndex(u64::from(i)), &frame(4, 2, i * 40))
            .unwrap();
    }
    sink.end().unwrap();
    assert_eq!(sink.entries(), 3);

    let bytes = sink.bytes().unwrap().to_vec();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    for i in 0..3usize {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), format!("frame_{i:05}.png"));
        let mut png = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut png).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0[0], (i as u8) * 40);
    }
}

#[test]
fn file_archive_is_written() {
    let path = scratch("ok.zip");
    let _ = std::fs::remove_file(&path);
    let mut sink = ZipSink::to_path(&path);
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 9)).unwrap();
    sink.end().unwrap();
    drop(sink);
    assert!(path.exists());
}

#[test]
fn size_mismatch_removes_partial_file() {
    let path = scratch("bad.zip");
    let mut sink = ZipSink::to_path(&path);
    sink.begin(cfg(2, 2)).unwrap();
    assert!(path.exists());
    let err = sink.push_frame(FrameIndex(0), &frame(3, 2, 0)).unwrap_err();
    assert!(matches!(err, MaptrailError::Encoding(_)));
    assert!(!path.exists());
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut sink = ZipSink::in_memory();
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(1, 1, 0)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame(1, 1, 0)).is_err());
}

#[test]
fn end_without_begin_fails() {
    let mut sink = ZipSink::in_memory();
    assert!(sink.end().is_err());
}

#[test]
fn abort_removes_started_archive() {
    let path = scratch("aborted.zip");
    let mut sink = ZipSink::to_path(&path);
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, 2)).unwrap();
    sink.abort();
    assert!(!path.exists());
    assert_eq!(sink.entries(), 0);
    assert!(sink.end().is_err());

    sink.abort();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 3)).unwrap();
    sink.end().unwrap();
    assert!(path.exists());
}
