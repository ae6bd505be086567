/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::io;

use erbify::file_utils::FileManager;

use crate::common;

#[test]
fn test_write_atomic_withNewPath_shouldWriteContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("index.html.erb");

    FileManager::write_atomic(&output, "<p><%= @title %></p>", false)?;

    assert_eq!(fs::read_to_string(&output)?, "<p><%= @title %></p>");
    assert_eq!(common::list_dir(temp_dir.path())?, vec!["index.html.erb"]);
    Ok(())
}

#[test]
fn test_write_atomic_withExistingPathAndNoOverwrite_shouldFailAndKeepFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = common::create_test_file(temp_dir.path(), "show.html.erb", "hand written")?;

    let error = FileManager::write_atomic(&output, "generated", false).unwrap_err();

    assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
    assert_eq!(fs::read_to_string(&output)?, "hand written");
    // the temporary file is cleaned up on failure
    assert_eq!(common::list_dir(temp_dir.path())?, vec!["show.html.erb"]);
    Ok(())
}

#[test]
fn test_write_atomic_withOverwrite_shouldReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = common::create_test_file(temp_dir.path(), "show.html.erb", "old")?;

    FileManager::write_atomic(&output, "new", true)?;

    assert_eq!(fs::read_to_string(&output)?, "new");
    assert_eq!(common::list_dir(temp_dir.path())?, vec!["show.html.erb"]);
    Ok(())
}

#[test]
fn test_write_atomic_withMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("missing").join("index.html.erb");

    assert!(FileManager::write_atomic(&output, "x", false).is_err());
    Ok(())
}

#[test]
fn test_file_exists_shouldOnlyAcceptFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.haml", "%p")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("b.haml")));
    Ok(())
}
