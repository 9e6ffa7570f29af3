use crate::models::ImportJob;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一个导入任务
pub async fn load_import_job(toml_file_path: &Path) -> Result<ImportJob> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let job: ImportJob = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(job.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有导入任务，按文件名排序
///
/// 解析失败的文件记录警告后跳过。
pub async fn load_all_import_jobs(folder_path: &str) -> Result<Vec<ImportJob>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut jobs = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_import_job(&path).await {
            Ok(job) => jobs.push(job),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_jobs_and_skips_broken_files() {
        let dir = std::env::temp_dir().join(format!("qb_jobs_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("a.toml"),
            "topic_id = \"T1\"\ncode = \"[]\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("b.toml"), "this is not toml = = =").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let jobs = load_all_import_jobs(dir.to_str().unwrap()).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].topic_id, "T1");
        assert!(jobs[0].file_path.as_deref().unwrap().ends_with("a.toml"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_folder_is_an_error() {
        assert!(load_all_import_jobs("/definitely/not/here").await.is_err());
    }
}
