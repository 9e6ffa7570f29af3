//! 层级与题目的单条维护操作 - 编排层
//!
//! 班级 / 章节 / 主题的增删改，单题查看与删除。
//! 写操作只提示结果，不做本地回滚（本地从未乐观更新）。

use crate::clients::{HierarchySource, QuestionBankClient, QuestionGateway};
use crate::models::{
    Difficulty, Localized, NamePayload, Named, NewTopic, QuestionSummary, QuestionType,
};
use crate::services::{build_single_question, SingleQuestionForm};
use crate::workflow::{DeleteOutcome, ListView, PaginationMode};
use anyhow::{bail, Result};
use serde_json::Value;
use tracing::{error, info, warn};

/// 单条维护命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    ShowClass { id: String },
    CreateClass { name: Localized },
    RenameClass { id: String, name: Localized },
    DeleteClass { id: String },
    CreateChapter { class_id: String, name: Localized },
    RenameChapter { id: String, class_id: String, name: Localized },
    DeleteChapter { id: String },
    ListChapters { class_id: String },
    ListTopics { lang: String },
    ListChapterTopics { chapter_id: String },
    CreateTopic { class_id: String, chapter_id: String, name: Localized },
    DeleteTopic { id: String },
    ShowQuestion { id: String },
    CreateQuestion { form: SingleQuestionForm },
    DeleteQuestion { id: String },
}

impl CatalogCommand {
    /// 从命令行参数解析，第一个参数为命令名；不认识的命令返回 None
    pub fn parse(name: &str, args: &[String]) -> Option<Result<Self>> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        let name_at = |i: usize| Localized::new(arg(i), arg(i + 1));

        let (required, command) = match name {
            "class" => (1, CatalogCommand::ShowClass { id: arg(0) }),
            "add-class" => (2, CatalogCommand::CreateClass { name: name_at(0) }),
            "rename-class" => (3, CatalogCommand::RenameClass { id: arg(0), name: name_at(1) }),
            "delete-class" => (1, CatalogCommand::DeleteClass { id: arg(0) }),
            "add-chapter" => (
                3,
                CatalogCommand::CreateChapter {
                    class_id: arg(0),
                    name: name_at(1),
                },
            ),
            "rename-chapter" => (
                4,
                CatalogCommand::RenameChapter {
                    id: arg(0),
                    class_id: arg(1),
                    name: name_at(2),
                },
            ),
            "delete-chapter" => (1, CatalogCommand::DeleteChapter { id: arg(0) }),
            "chapters" => (1, CatalogCommand::ListChapters { class_id: arg(0) }),
            "topics" if args.first().map(String::as_str) == Some("--chapter") => (
                2,
                CatalogCommand::ListChapterTopics { chapter_id: arg(1) },
            ),
            "topics" => (
                0,
                CatalogCommand::ListTopics {
                    lang: args.first().cloned().unwrap_or_else(|| "uz".to_string()),
                },
            ),
            "add-topic" => (
                4,
                CatalogCommand::CreateTopic {
                    class_id: arg(0),
                    chapter_id: arg(1),
                    name: name_at(2),
                },
            ),
            "delete-topic" => (1, CatalogCommand::DeleteTopic { id: arg(0) }),
            "question" => (1, CatalogCommand::ShowQuestion { id: arg(0) }),
            "add-question" => return Some(parse_question_form(args)),
            "delete-question" => (1, CatalogCommand::DeleteQuestion { id: arg(0) }),
            _ => return None,
        };

        if args.len() < required || args.iter().take(required).any(|a| a.trim().is_empty()) {
            return Some(Err(anyhow::anyhow!(
                "命令 {} 需要 {} 个非空参数，实际 {} 个",
                name,
                required,
                args.len()
            )));
        }
        Some(Ok(command))
    }
}

/// `add-question <主题id> <题型> <难度> <题干uz> <题干ru> <答案uz> <答案ru> [选项uz 选项ru]...`
///
/// 这里只解析字段，必填项和选项数量由 `build_single_question` 检查。
fn parse_question_form(args: &[String]) -> Result<CatalogCommand> {
    if args.len() < 7 {
        bail!("命令 add-question 至少需要 7 个参数，实际 {} 个", args.len());
    }
    if args.len() % 2 == 0 {
        bail!("选项必须成对给出（uz ru）");
    }

    let question_type = QuestionType::parse(&args[1])
        .ok_or_else(|| anyhow::anyhow!("未知题型: {}", args[1]))?;
    let level =
        Difficulty::parse(&args[2]).ok_or_else(|| anyhow::anyhow!("未知难度: {}", args[2]))?;
    let options = args[7..]
        .chunks(2)
        .map(|pair| Localized::new(pair[0].clone(), pair[1].clone()))
        .collect();

    Ok(CatalogCommand::CreateQuestion {
        form: SingleQuestionForm {
            question: Localized::new(args[3].clone(), args[4].clone()),
            answer: Localized::new(args[5].clone(), args[6].clone()),
            options,
            question_type,
            level,
            index: None,
            topic_id: args[0].clone(),
        },
    })
}

/// 执行单条维护命令
pub async fn execute(
    client: &QuestionBankClient,
    command: CatalogCommand,
    page_size: usize,
) -> Result<()> {
    let result = match command {
        CatalogCommand::ShowClass { id } => {
            let class = client.get_class(&id).await?;
            info!("[{}] {} / {}", class.id, class.name.uz, class.name.ru);
            return Ok(());
        }
        CatalogCommand::CreateClass { name } => {
            client
                .create_class(&NamePayload {
                    name,
                    class_id: None,
                })
                .await
        }
        CatalogCommand::RenameClass { id, name } => {
            client
                .update_class(
                    &id,
                    &NamePayload {
                        name,
                        class_id: None,
                    },
                )
                .await
        }
        CatalogCommand::DeleteClass { id } => client.delete_class(&id).await,
        CatalogCommand::CreateChapter { class_id, name } => {
            client
                .create_chapter(&NamePayload {
                    name,
                    class_id: Some(class_id),
                })
                .await
        }
        CatalogCommand::RenameChapter { id, class_id, name } => {
            client
                .update_chapter(
                    &id,
                    &NamePayload {
                        name,
                        class_id: Some(class_id),
                    },
                )
                .await
        }
        CatalogCommand::DeleteChapter { id } => client.delete_chapter(&id).await,
        CatalogCommand::ListChapters { class_id } => {
            let chapters = client.list_chapters(&class_id).await?;
            log_entities("章节", &chapters);
            return Ok(());
        }
        CatalogCommand::ListChapterTopics { chapter_id } => {
            let topics = client.list_topics(&chapter_id).await?;
            log_entities("主题", &topics);
            return Ok(());
        }
        CatalogCommand::ListTopics { lang } => {
            let topics = client.list_all_topics(&lang).await?;
            for (i, topic) in topics.iter().enumerate() {
                info!("{}. [{}] {}", i + 1, topic.id, topic.name.display());
            }
            return Ok(());
        }
        CatalogCommand::CreateTopic {
            class_id,
            chapter_id,
            name,
        } => {
            client
                .create_topic(&NewTopic {
                    class_id,
                    chapter_id,
                    title: name.clone(),
                    name,
                })
                .await
        }
        CatalogCommand::DeleteTopic { id } => client.delete_topic(&id).await,
        CatalogCommand::ShowQuestion { id } => {
            let question = client.get_question(&id).await?;
            info!("{}", serde_json::to_string_pretty(&question)?);
            return Ok(());
        }
        CatalogCommand::CreateQuestion { form } => {
            let body = build_single_question(&form)?;
            client.create_question(&body).await
        }
        CatalogCommand::DeleteQuestion { id } => {
            return delete_question(client, &id, page_size).await;
        }
    };

    report_mutation(result.map_err(anyhow::Error::from))
}

/// 走一遍删除确认流程：成功后重新拉取第一页
async fn delete_question(client: &QuestionBankClient, id: &str, page_size: usize) -> Result<()> {
    let mut view: ListView<QuestionSummary> = ListView::new(PaginationMode::Windowed, page_size);
    view.request_delete(id);

    let outcome = view
        .confirm_delete(|id| async move { client.delete_question(&id).await })
        .await;

    match outcome {
        DeleteOutcome::Deleted { .. } => {
            let request = view.begin_load();
            view.apply(client.list_questions(request).await);
            info!("✓ 题目 {} 已删除，列表已刷新", id);
            Ok(())
        }
        DeleteOutcome::Failed { message, .. } => {
            error!("❌ 删除题目 {} 失败: {}", id, message);
            bail!("删除失败: {}", message)
        }
        DeleteOutcome::NothingPending => Ok(()),
    }
}

fn log_entities<T: Named>(label: &str, items: &[T]) {
    if items.is_empty() {
        warn!("⚠️ 没有找到{}", label);
        return;
    }
    for (i, item) in items.iter().enumerate() {
        info!("{}. [{}] {}", i + 1, item.id(), item.display_name());
    }
}

fn report_mutation(result: Result<Value>) -> Result<()> {
    match result {
        Ok(response) => {
            info!("✓ 操作成功: {}", response);
            Ok(())
        }
        Err(e) => {
            error!("❌ 操作失败: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        let cmd = CatalogCommand::parse("add-chapter", &args(&["1", "Sonlar", "Числа"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            CatalogCommand::CreateChapter {
                class_id: "1".to_string(),
                name: Localized::new("Sonlar", "Числа"),
            }
        );

        let cmd = CatalogCommand::parse("topics", &[]).unwrap().unwrap();
        assert_eq!(
            cmd,
            CatalogCommand::ListTopics {
                lang: "uz".to_string()
            }
        );
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(CatalogCommand::parse("rename-class", &args(&["1", "x"]))
            .unwrap()
            .is_err());
        assert!(CatalogCommand::parse("delete-question", &args(&[" "]))
            .unwrap()
            .is_err());
    }

    #[test]
    fn parses_add_question_with_option_pairs() {
        let cmd = CatalogCommand::parse(
            "add-question",
            &args(&["T1", "mcq", "easy", "2+2?", "2+2?", "4", "4", "3", "3", "4", "4"]),
        )
        .unwrap()
        .unwrap();
        let CatalogCommand::CreateQuestion { form } = cmd else {
            panic!("expected CreateQuestion");
        };
        assert_eq!(form.topic_id, "T1");
        assert_eq!(form.question_type, QuestionType::MultipleChoice);
        assert_eq!(form.level, Difficulty::Easy);
        assert_eq!(form.options.len(), 2);
        assert_eq!(form.options[1], Localized::new("4", "4"));

        let body = build_single_question(&form).unwrap();
        assert_eq!(body["question_type"], "multiple_choice");
        assert_eq!(body["topic_id"], "T1");
    }

    #[test]
    fn add_question_rejects_bad_fields() {
        let open = args(&["T1", "open", "hard", "q", "q", "a", "a"]);
        assert!(CatalogCommand::parse("add-question", &open).unwrap().is_ok());

        let unknown_type = args(&["T1", "essay", "hard", "q", "q", "a", "a"]);
        assert!(CatalogCommand::parse("add-question", &unknown_type)
            .unwrap()
            .is_err());

        let dangling_option = args(&["T1", "mcq", "easy", "q", "q", "a", "a", "x"]);
        assert!(CatalogCommand::parse("add-question", &dangling_option)
            .unwrap()
            .is_err());

        assert!(CatalogCommand::parse("add-question", &args(&["T1"]))
            .unwrap()
            .is_err());
    }

    #[test]
    fn parses_hierarchy_listings() {
        let cmd = CatalogCommand::parse("chapters", &args(&["3"])).unwrap().unwrap();
        assert_eq!(
            cmd,
            CatalogCommand::ListChapters {
                class_id: "3".to_string()
            }
        );

        let cmd = CatalogCommand::parse("topics", &args(&["--chapter", "12"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            CatalogCommand::ListChapterTopics {
                chapter_id: "12".to_string()
            }
        );

        assert!(CatalogCommand::parse("topics", &args(&["--chapter"]))
            .unwrap()
            .is_err());
        assert!(CatalogCommand::parse("chapters", &[]).unwrap().is_err());
    }

    #[test]
    fn unknown_command_is_not_ours() {
        assert!(CatalogCommand::parse("import", &[]).is_none());
    }
}
