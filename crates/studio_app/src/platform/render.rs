use studio_core::{
    AppViewModel, ContentFeedEntry, Engagement, EngagementTarget, EntityRef, FeedPage, JobRowView,
    LikeOutcome, Notice, NoticeKind,
};

fn kind_label(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
        NoticeKind::Info => "info",
        NoticeKind::Loading => "...",
    }
}

pub(crate) fn notice_line(notice: &Notice) -> String {
    match &notice.description {
        Some(description) => format!(
            "[{}] {}: {}",
            kind_label(notice.kind),
            notice.message,
            description
        ),
        None => format!("[{}] {}", kind_label(notice.kind), notice.message),
    }
}

pub(crate) fn job_line(job: &JobRowView) -> String {
    let remote = job
        .job_id
        .as_ref()
        .map(|id| format!(" job {id}"))
        .unwrap_or_default();
    format!("upload {} \"{}\"{} {}", job.submission, job.title, remote, job.state)
}

pub(crate) fn entry_line(entry: &ContentFeedEntry) -> String {
    let engagement = entry.engagement();
    let heart = if engagement.liked_by_current_user {
        "*"
    } else {
        " "
    };
    format!(
        "{} {:<7} {:<12} {}  by {}  {} likes{}  {} comments",
        entry.created_at().format("%Y-%m-%d"),
        entry.kind().to_string(),
        entry.id().as_str(),
        entry.title(),
        entry.author(),
        engagement.like_count,
        heart,
        entry.comment_count()
    )
}

pub(crate) fn feed_lines(page: &FeedPage) -> Vec<String> {
    let mut lines: Vec<String> = page.entries.iter().map(entry_line).collect();
    if page.entries.is_empty() {
        lines.push("(nothing published yet)".to_string());
    }
    lines.push(format!(
        "page {}/{} of {} items",
        page.page + 1,
        page.total_pages.max(1),
        page.total_entries
    ));
    lines
}

/// Notice and job lines for the current view, in display order.
pub(crate) fn status_lines(view: &AppViewModel) -> Vec<String> {
    view.jobs
        .iter()
        .map(job_line)
        .chain(view.notices.iter().map(notice_line))
        .collect()
}

/// Result line for a settled like. `Err` carries the failure reason.
pub(crate) fn like_line(
    target: &EntityRef,
    outcome: Option<&LikeOutcome>,
    settled: Option<Engagement>,
) -> Result<String, String> {
    match outcome.filter(|outcome| &outcome.target == target) {
        None => Err("no response from server".to_string()),
        Some(LikeOutcome {
            result: Err(reason),
            ..
        }) => Err(reason.clone()),
        Some(_) => Ok(match settled {
            Some(engagement) => {
                let verb = if engagement.liked_by_current_user {
                    "Liked"
                } else {
                    "Unliked"
                };
                format!("{verb} {target} ({} likes)", engagement.like_count)
            }
            None => format!("Toggled like on {target}"),
        }),
    }
}
