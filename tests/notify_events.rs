// tests/notify_events.rs

mod common;
use crate::common::p;

use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};

use civet::watch::{FsEvent, RenamePairer};

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, path| ev.add_path(p(path)))
}

#[test]
fn creates_and_removes_carry_the_kind() {
    assert_eq!(
        FsEvent::from_notify(&event(EventKind::Create(CreateKind::File), &["/x/a.coffee"])),
        vec![FsEvent::created("/x/a.coffee")]
    );
    assert_eq!(
        FsEvent::from_notify(&event(EventKind::Create(CreateKind::Folder), &["/x/lib"])),
        vec![FsEvent::dir_created("/x/lib")]
    );
    assert_eq!(
        FsEvent::from_notify(&event(EventKind::Remove(RemoveKind::Folder), &["/x/lib"])),
        vec![FsEvent::dir_deleted("/x/lib")]
    );
    assert_eq!(
        FsEvent::from_notify(&event(EventKind::Remove(RemoveKind::Any), &["/x/a.coffee"])),
        vec![FsEvent::deleted("/x/a.coffee")]
    );
}

#[test]
fn content_changes_become_modified() {
    let ev = event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        &["/nonexistent/a.scss"],
    );
    assert_eq!(FsEvent::from_notify(&ev), vec![FsEvent::modified("/nonexistent/a.scss")]);
}

#[test]
fn paired_rename_becomes_moved() {
    let ev = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
        &["/nonexistent/old.coffee", "/nonexistent/new.coffee"],
    );
    assert_eq!(
        FsEvent::from_notify(&ev),
        vec![FsEvent::moved("/nonexistent/old.coffee", "/nonexistent/new.coffee")]
    );
}

#[test]
fn half_renames_split_into_delete_and_create() {
    let from = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        &["/nonexistent/old.coffee"],
    );
    let to = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::To)),
        &["/nonexistent/new.coffee"],
    );
    assert_eq!(FsEvent::from_notify(&from), vec![FsEvent::deleted("/nonexistent/old.coffee")]);
    assert_eq!(FsEvent::from_notify(&to), vec![FsEvent::created("/nonexistent/new.coffee")]);
}

#[test]
fn access_and_atime_events_are_dropped() {
    let access = event(EventKind::Access(AccessKind::Any), &["/x/a.coffee"]);
    let atime = event(
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)),
        &["/x/a.coffee"],
    );
    assert!(FsEvent::from_notify(&access).is_empty());
    assert!(FsEvent::from_notify(&atime).is_empty());
    assert!(FsEvent::from_notify(&event(EventKind::Other, &["/x"])).is_empty());
}

fn rename_half(mode: RenameMode, path: &str, cookie: usize) -> Event {
    event(EventKind::Modify(ModifyKind::Name(mode)), &[path]).set_tracker(cookie)
}

/// inotify reports `From`, `To`, then the paired `Both`: only the move is
/// dispatched, with no stray delete or create around it.
#[test]
fn paired_rename_halves_collapse_into_one_move() {
    let mut renames = RenamePairer::new();

    assert!(renames.push(rename_half(RenameMode::From, "/nonexistent/a.coffee", 7)).is_empty());
    assert!(renames.push(rename_half(RenameMode::To, "/nonexistent/a.scss", 7)).is_empty());
    assert!(renames.has_pending());

    let both = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
        &["/nonexistent/a.coffee", "/nonexistent/a.scss"],
    )
    .set_tracker(7);
    assert_eq!(
        renames.push(both),
        vec![FsEvent::moved("/nonexistent/a.coffee", "/nonexistent/a.scss")]
    );
    assert!(!renames.has_pending());
    assert!(renames.flush().is_empty());
}

/// A file moved in from outside the watched tree only ever gets its `To`
/// half; it still arrives as a creation.
#[test]
fn unpaired_to_half_is_released_as_created() {
    let mut renames = RenamePairer::new();
    assert!(renames.push(rename_half(RenameMode::To, "/nonexistent/in.coffee", 3)).is_empty());
    assert_eq!(renames.flush(), vec![FsEvent::created("/nonexistent/in.coffee")]);

    // The next unrelated event releases it too, ahead of itself.
    assert!(renames.push(rename_half(RenameMode::To, "/nonexistent/in.coffee", 4)).is_empty());
    let next = event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        &["/nonexistent/other.coffee"],
    );
    assert_eq!(
        renames.push(next),
        vec![
            FsEvent::created("/nonexistent/in.coffee"),
            FsEvent::modified("/nonexistent/other.coffee"),
        ]
    );
}

#[test]
fn untracked_events_pass_straight_through() {
    let mut renames = RenamePairer::new();
    let from = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        &["/nonexistent/old.coffee"],
    );
    assert_eq!(renames.push(from), vec![FsEvent::deleted("/nonexistent/old.coffee")]);
    assert!(!renames.has_pending());
}
