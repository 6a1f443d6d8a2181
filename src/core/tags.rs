use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use lofty::config::WriteOptions;
use lofty::ogg::{OggPictureStorage, VorbisComments};
use lofty::picture::{MimeType, Picture, PictureInformation, PictureType};
use lofty::tag::TagExt;
use ytogg_core::models::source::SourceRecord;

use crate::core::cover::encode_jpeg;
use crate::core::error::{PipelineError, Result};
use crate::models::media::AudioArtifact;

pub const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";
pub const PICTURE_DESCRIPTION: &str = "Cover";

pub const TEXT_KEYS: [&str; 8] = [
    "TITLE",
    "ARTIST",
    "DATE",
    "TRACKNUMBER",
    "DISCNUMBER",
    "COMMENT",
    "ALBUMARTIST",
    "ALBUM",
];

/// The complete set of Vorbis comments written for one run, in write order.
///
/// The picture is kept both as the lofty picture (for writing) and as its
/// encoded `METADATA_BLOCK_PICTURE` value (for inspection).
#[derive(Debug, Clone)]
pub struct TagSet {
    fields: Vec<(&'static str, String)>,
    picture: Option<(Picture, PictureInformation)>,
}

impl TagSet {
    pub fn for_source(record: &SourceRecord, cover: Option<&DynamicImage>) -> Result<Self> {
        let year = record.year.to_string();
        let values = [
            record.title.clone(),
            record.author.clone(),
            year,
            "1".to_string(),
            "1".to_string(),
            record.description.clone(),
            record.author.clone(),
            record.title.clone(),
        ];
        let mut fields: Vec<(&'static str, String)> = TEXT_KEYS.into_iter().zip(values).collect();

        let picture = match cover {
            Some(image) => {
                let (picture, info) = cover_picture(image)?;
                fields.push((PICTURE_KEY, encode_picture_block(&picture, info)));
                Some((picture, info))
            }
            None => None,
        };

        Ok(Self { fields, picture })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn has_picture(&self) -> bool {
        self.picture.is_some()
    }

    pub fn to_vorbis_comments(&self) -> lofty::error::Result<VorbisComments> {
        let mut comments = VorbisComments::default();
        for (key, value) in self.iter().filter(|(k, _)| *k != PICTURE_KEY) {
            comments.push(key.to_string(), value.to_string());
        }
        if let Some((picture, info)) = &self.picture {
            comments.insert_picture(picture.clone(), Some(*info))?;
        }
        Ok(comments)
    }
}

fn cover_picture(image: &DynamicImage) -> Result<(Picture, PictureInformation)> {
    let jpeg = encode_jpeg(image)?;
    let picture = Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Jpeg),
        Some(PICTURE_DESCRIPTION.into()),
        jpeg,
    );
    let info = PictureInformation {
        width: image.width(),
        height: image.height(),
        color_depth: 24,
        num_colors: 0,
    };
    Ok((picture, info))
}

fn encode_picture_block(picture: &Picture, info: PictureInformation) -> String {
    STANDARD.encode(picture.as_flac_bytes(info, false))
}

/// JPEG-encodes `image` and wraps it in a base64 FLAC picture block tagged
/// as the front cover.
pub fn picture_block(image: &DynamicImage) -> Result<String> {
    let (picture, info) = cover_picture(image)?;
    Ok(encode_picture_block(&picture, info))
}

pub trait MetadataWriter: Send + Sync {
    /// Replaces the artifact's comments with `tags` in a single save.
    fn persist(&self, artifact: &AudioArtifact, tags: &TagSet) -> Result<()>;
}

pub struct VorbisCommentWriter;

impl MetadataWriter for VorbisCommentWriter {
    fn persist(&self, artifact: &AudioArtifact, tags: &TagSet) -> Result<()> {
        let to_tag_error = |source| PipelineError::TagWrite {
            path: artifact.path().to_path_buf(),
            source,
        };
        tags.to_vorbis_comments()
            .map_err(to_tag_error)?
            .save_to_path(artifact.path(), WriteOptions::default())
            .map_err(to_tag_error)?;
        tracing::info!(
            "wrote {} tags{} to {:?}",
            tags.keys().count(),
            if tags.has_picture() { " with cover" } else { "" },
            artifact.path()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use lofty::config::{ParseOptions, ParsingMode};
    use lofty::file::AudioFile;
    use lofty::ogg::VorbisFile;
    use std::path::Path;

    fn record() -> SourceRecord {
        SourceRecord {
            url: "https://www.youtube.com/watch?v=abc123XYZ".into(),
            video_id: "abc123XYZ".into(),
            title: "Example Song".into(),
            author: "Example Artist".into(),
            year: 2020,
            description: "Line one\nLine two".into(),
        }
    }

    fn cover() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(720, 720, Rgb([10, 20, 30])))
    }

    #[test]
    fn text_fields_without_cover() {
        let tags = TagSet::for_source(&record(), None).unwrap();
        assert_eq!(tags.keys().collect::<Vec<_>>(), TEXT_KEYS.to_vec());
        assert_eq!(tags.get("TITLE"), Some("Example Song"));
        assert_eq!(tags.get("ARTIST"), Some("Example Artist"));
        assert_eq!(tags.get("DATE"), Some("2020"));
        assert_eq!(tags.get("TRACKNUMBER"), Some("1"));
        assert_eq!(tags.get("DISCNUMBER"), Some("1"));
        assert_eq!(tags.get("COMMENT"), Some("Line one\nLine two"));
        assert_eq!(tags.get("ALBUMARTIST"), Some("Example Artist"));
        assert_eq!(tags.get("ALBUM"), Some("Example Song"));
        assert!(!tags.has_picture());
    }

    #[test]
    fn no_cover_means_no_picture_in_comments() {
        let comments = TagSet::for_source(&record(), None)
            .unwrap()
            .to_vorbis_comments()
            .unwrap();
        assert!(comments.pictures().is_empty());
        assert_eq!(comments.get(PICTURE_KEY), None);
    }

    #[test]
    fn cover_adds_picture_key_only() {
        let tags = TagSet::for_source(&record(), Some(&cover())).unwrap();
        let keys: Vec<_> = tags.keys().collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(&keys[..8], &TEXT_KEYS[..]);
        assert_eq!(keys[8], PICTURE_KEY);
        assert!(tags.has_picture());
        assert_eq!(tags.get(PICTURE_KEY), Some(picture_block(&cover()).unwrap().as_str()));
    }

    #[test]
    fn picture_block_decodes_to_front_cover_jpeg() {
        let encoded = picture_block(&cover()).unwrap();
        let raw = STANDARD.decode(&encoded).unwrap();
        let (picture, info) = Picture::from_flac_bytes(&raw, false, ParsingMode::Strict).unwrap();

        assert_eq!(picture.pic_type(), PictureType::CoverFront);
        assert_eq!(picture.mime_type(), Some(&MimeType::Jpeg));
        assert_eq!(picture.description(), Some(PICTURE_DESCRIPTION));
        assert_eq!((info.width, info.height), (720, 720));

        let embedded = image::load_from_memory(picture.data()).unwrap();
        assert_eq!((embedded.width(), embedded.height()), (720, 720));
    }

    #[test]
    fn picture_block_starts_with_front_cover_type() {
        let raw = STANDARD.decode(picture_block(&cover()).unwrap()).unwrap();
        assert_eq!(&raw[..4], &3u32.to_be_bytes());
        let mime_len = u32::from_be_bytes(raw[4..8].try_into().unwrap()) as usize;
        assert_eq!(&raw[8..8 + mime_len], b"image/jpeg");
    }

    #[test]
    fn vorbis_comments_carry_every_field() {
        let tags = TagSet::for_source(&record(), Some(&cover())).unwrap();
        let comments = tags.to_vorbis_comments().unwrap();
        for key in TEXT_KEYS {
            assert_eq!(comments.get(key), tags.get(key), "{}", key);
        }
        assert_eq!(comments.pictures().len(), 1);
        let (picture, info) = &comments.pictures()[0];
        assert_eq!(picture.pic_type(), PictureType::CoverFront);
        assert_eq!(info.width, 720);
    }

    fn ogg_crc(data: &[u8]) -> u32 {
        let mut crc = 0u32;
        for byte in data {
            crc ^= u32::from(*byte) << 24;
            for _ in 0..8 {
                crc = if crc & 0x8000_0000 != 0 {
                    (crc << 1) ^ 0x04c1_1db7
                } else {
                    crc << 1
                };
            }
        }
        crc
    }

    /// One Ogg page holding whole packets, each shorter than 255 bytes.
    fn ogg_page(header_type: u8, sequence: u32, granule: u64, packets: &[&[u8]]) -> Vec<u8> {
        let mut page = b"OggS".to_vec();
        page.push(0);
        page.push(header_type);
        page.extend(granule.to_le_bytes());
        page.extend(0x7974_6f67u32.to_le_bytes());
        page.extend(sequence.to_le_bytes());
        page.extend([0; 4]);
        page.push(packets.len() as u8);
        for packet in packets {
            assert!(packet.len() < 255);
            page.push(packet.len() as u8);
        }
        for packet in packets {
            page.extend_from_slice(packet);
        }
        let crc = ogg_crc(&page);
        page[22..26].copy_from_slice(&crc.to_le_bytes());
        page
    }

    /// Headers plus one tiny audio page, the shape ffmpeg writes, with an
    /// empty comment list.
    fn write_vorbis_fixture(path: &Path) {
        let mut ident = vec![1];
        ident.extend(b"vorbis");
        ident.extend(0u32.to_le_bytes());
        ident.push(2);
        ident.extend(44_100u32.to_le_bytes());
        ident.extend(0i32.to_le_bytes());
        ident.extend(128_000i32.to_le_bytes());
        ident.extend(0i32.to_le_bytes());
        ident.push(0xb8);
        ident.push(1);

        let mut comment = vec![3];
        comment.extend(b"vorbis");
        comment.extend(6u32.to_le_bytes());
        comment.extend(b"Lavf60");
        comment.extend(0u32.to_le_bytes());
        comment.push(1);

        let mut setup = vec![5];
        setup.extend(b"vorbis");
        setup.extend([0; 8]);

        let mut file = ogg_page(0x02, 0, 0, &[&ident]);
        file.extend(ogg_page(0x00, 1, 0, &[&comment, &setup]));
        let audio = [0u8; 16];
        file.extend(ogg_page(0x04, 2, 44_100, &[&audio]));
        std::fs::write(path, file).unwrap();
    }

    fn read_back(path: &Path) -> VorbisFile {
        let mut file = std::fs::File::open(path).unwrap();
        VorbisFile::read_from(&mut file, ParseOptions::new()).unwrap()
    }

    #[test]
    fn persist_writes_fields_and_cover_to_ogg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Example Artist - Example Song.ogg");
        write_vorbis_fixture(&path);
        let artifact = AudioArtifact::new(path.clone());

        let tags = TagSet::for_source(&record(), Some(&cover())).unwrap();
        VorbisCommentWriter.persist(&artifact, &tags).unwrap();

        let file = read_back(&path);
        let comments = file.vorbis_comments();
        let keys: Vec<_> = comments.items().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, TEXT_KEYS);
        for key in TEXT_KEYS {
            assert_eq!(comments.get(key), tags.get(key), "{}", key);
        }
        assert_eq!(comments.vendor(), "Lavf60");
        assert_eq!(comments.pictures().len(), 1);
        let (picture, info) = &comments.pictures()[0];
        assert_eq!(picture.pic_type(), PictureType::CoverFront);
        assert_eq!(picture.description(), Some(PICTURE_DESCRIPTION));
        assert_eq!((info.width, info.height), (720, 720));
    }

    #[test]
    fn persist_without_cover_replaces_previous_picture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.ogg");
        write_vorbis_fixture(&path);
        let artifact = AudioArtifact::new(path.clone());

        let with_cover = TagSet::for_source(&record(), Some(&cover())).unwrap();
        VorbisCommentWriter.persist(&artifact, &with_cover).unwrap();
        let without = TagSet::for_source(&record(), None).unwrap();
        VorbisCommentWriter.persist(&artifact, &without).unwrap();

        let file = read_back(&path);
        let comments = file.vorbis_comments();
        assert_eq!(comments.items().len(), TEXT_KEYS.len());
        assert!(comments.pictures().is_empty());
        assert_eq!(comments.get(PICTURE_KEY), None);
    }

    #[test]
    fn persist_to_non_ogg_file_is_tag_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ogg");
        std::fs::write(&path, b"definitely not an ogg stream").unwrap();

        let artifact = AudioArtifact::new(path.clone());
        let tags = TagSet::for_source(&record(), None).unwrap();
        let err = VorbisCommentWriter.persist(&artifact, &tags).unwrap_err();

        match err {
            PipelineError::TagWrite { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other),
        }
    }
}
