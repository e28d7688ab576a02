//! Conversion of backend payloads into [`RoastResult`]s.

use ragebait_client::{ApiResult, CommentarySegment, GenerateResponse, MemeResult, VideoInfo};
use ragebait_models::{RoastResult, TranscriptLine};

/// Transcript lines in segment order.
pub fn transcript_from_segments(segments: &[CommentarySegment]) -> Vec<TranscriptLine> {
    segments
        .iter()
        .map(|s| TranscriptLine::from_start_time(s.start_time, s.text.clone()))
        .collect()
}

/// The two independently reported outcomes of a generation run.
///
/// The meme step is best-effort: its error is kept here for reporting and
/// never turns the job into a failure.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub generation: GenerateResponse,
    pub meme: ApiResult<MemeResult>,
}

impl GenerationOutcome {
    pub fn meme_succeeded(&self) -> bool {
        self.meme.is_ok()
    }

    /// Merge both outcomes into the terminal `completed` record.
    ///
    /// The record is keyed by the backend video id from here on.
    pub fn into_result(self) -> RoastResult {
        let GenerationOutcome { generation, meme } = self;

        let mut result = RoastResult::completed(generation.video_id, generation.video_url);
        result.thumbnail_url = generation.thumbnail_url;
        result.duration = Some(generation.duration);
        result.lens = Some(generation.lens);
        result.transcript = Some(transcript_from_segments(&generation.commentary_segments));

        if let Ok(meme) = meme {
            result.apply_meme(meme.meme_url, meme.caption);
        }

        result
    }
}

/// Normalize a direct video probe into a `completed` record.
pub fn completed_from_video(info: VideoInfo) -> RoastResult {
    let mut result = RoastResult::completed(info.video_id, info.video_url);
    result.thumbnail_url = info.thumbnail_url;
    result.meme_url = info.meme_url;
    result.caption = info.caption;
    result.duration = Some(info.duration);
    result.lens = Some(info.lens);
    result.transcript = Some(transcript_from_segments(&info.segments));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragebait_client::ApiError;
    use ragebait_models::JobStatus;

    fn segment(start_time: f64, text: &str) -> CommentarySegment {
        CommentarySegment {
            start_time,
            end_time: start_time + 1.0,
            text: text.to_string(),
            emotion: "mock".to_string(),
        }
    }

    fn generation() -> GenerateResponse {
        GenerateResponse {
            video_id: "v1".to_string(),
            video_url: "http://x/v1.mp4".to_string(),
            thumbnail_url: None,
            commentary_segments: vec![segment(2.345, "look at this"), segment(12.34, "incredible")],
            lens: "nature_documentary".to_string(),
            duration: 10.0,
        }
    }

    #[test]
    fn test_transcript_keeps_order_and_formats_timestamps() {
        let lines = transcript_from_segments(&generation().commentary_segments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].timestamp, "2.3s");
        assert_eq!(lines[0].text, "look at this");
        assert_eq!(lines[1].timestamp, "12.3s");
    }

    #[test]
    fn test_outcome_with_meme() {
        let outcome = GenerationOutcome {
            generation: generation(),
            meme: Ok(MemeResult {
                meme_id: "m1".to_string(),
                meme_url: "http://x/m1.png".to_string(),
                caption: "lol".to_string(),
                style: "deepfried".to_string(),
                image_prompt: String::new(),
            }),
        };
        assert!(outcome.meme_succeeded());

        let result = outcome.into_result();
        assert_eq!(result.job_id, "v1");
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.meme_url.as_deref(), Some("http://x/m1.png"));
        assert_eq!(result.caption.as_deref(), Some("lol"));
        assert!(result.is_consistent());
    }

    #[test]
    fn test_outcome_without_meme_still_completes() {
        let outcome = GenerationOutcome {
            generation: generation(),
            meme: Err(ApiError::RequestFailed("Meme generation failed: engine down".into())),
        };
        let result = outcome.into_result();
        assert_eq!(result.status, JobStatus::Completed);
        assert!(result.meme_url.is_none());
        assert!(result.caption.is_none());
        assert_eq!(result.transcript.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_completed_from_video() {
        let info = VideoInfo {
            video_id: "abc".to_string(),
            video_url: "http://x/abc.mp4".to_string(),
            thumbnail_url: Some("http://x/abc.jpg".to_string()),
            meme_url: None,
            caption: Some("caption".to_string()),
            lens: "true_crime".to_string(),
            duration: 8.5,
            segments: vec![segment(0.04, "and so it begins")],
        };
        let result = completed_from_video(info);
        assert_eq!(result.job_id, "abc");
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.duration, Some(8.5));
        assert_eq!(result.transcript.unwrap()[0].timestamp, "0.0s");
    }
}
