use anyhow::{bail, Result};
use question_bank_admin::orchestrator::CatalogCommand;
use question_bank_admin::utils::logging;
use question_bank_admin::{App, Config};

const USAGE: &str = "import | questions [页码] [主题id] | classes | class <id> | \
add-class <uz> <ru> | rename-class <id> <uz> <ru> | delete-class <id> | \
chapters <班级id> | add-chapter <班级id> <uz> <ru> | rename-chapter <id> <班级id> <uz> <ru> | \
delete-chapter <id> | topics [lang] | topics --chapter <章节id> | \
add-topic <班级id> <章节id> <uz> <ru> | delete-topic <id> | question <id> | \
add-question <主题id> <题型> <难度> <题干uz> <题干ru> <答案uz> <答案ru> [选项uz 选项ru]... | \
delete-question <id>";

/// 命令行子命令
enum Command {
    /// 处理导入目录下的全部任务（默认）
    Import,
    Questions { page: usize, topic_id: Option<String> },
    Classes,
    Catalog(CatalogCommand),
}

impl Command {
    fn from_args(args: Vec<String>) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Import);
        };
        match name.as_str() {
            "import" => Ok(Command::Import),
            "questions" => {
                let page = match rest.first() {
                    Some(raw) => raw.parse()?,
                    None => 1,
                };
                Ok(Command::Questions {
                    page,
                    topic_id: rest.get(1).cloned(),
                })
            }
            "classes" => Ok(Command::Classes),
            other => match CatalogCommand::parse(other, rest) {
                Some(command) => Ok(Command::Catalog(command?)),
                None => bail!("未知命令: {}\n可用命令: {}", other, USAGE),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    let command = Command::from_args(std::env::args().skip(1).collect())?;

    let app = App::initialize(config).await?;
    match command {
        Command::Import => {
            app.run().await?;
        }
        Command::Questions { page, topic_id } => {
            app.list_questions(topic_id.as_deref(), page).await?;
        }
        Command::Classes => app.list_classes().await?,
        Command::Catalog(command) => app.run_catalog(command).await?,
    }

    Ok(())
}
