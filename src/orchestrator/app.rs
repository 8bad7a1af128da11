//! 终端应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：打印启动信息、创建 Gemini 服务和流程控制器
//! 2. **输入循环**：逐行读取标准输入，解析为命令后交给控制器
//! 3. **界面渲染**：根据状态快照渲染当前界面
//! 4. **插图观察**：订阅状态，插图到达时保存到输出目录并提示
//!
//! 答题卡片的本地状态只存在于这里，每个练习册会话重新创建。

use std::collections::HashSet;
use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{AnalysisResult, IllustrationState, Question};
use crate::orchestrator::commands::{parse_command, resolve_answer, AnswerInput, Command};
use crate::presentation::question_card::PLACEHOLDER_GLYPH;
use crate::presentation::{read_image, views, QuestionCard};
use crate::services::{GeminiContentService, WorkbookExporter};
use crate::utils::logging::log_startup;
use crate::workflow::{AppState, AppStore, PassSummary, SessionId, WorkbookController, WorkflowStage};

/// 应用主结构
pub struct App {
    controller: WorkbookController,
    exporter: WorkbookExporter,
    /// 本次运行的启动时间，用于区分不同运行的输出目录
    run_label: String,
}

/// 当前练习册会话的答题卡片
#[derive(Debug, Default)]
struct CardDeck {
    session: Option<SessionId>,
    cards: Vec<QuestionCard>,
}

impl CardDeck {
    /// 会话变化时重新创建卡片
    fn sync(&mut self, state: &AppState) {
        if self.session == Some(state.session) {
            return;
        }
        let count = state.analysis.as_ref().map_or(0, |a| a.questions.len());
        self.session = Some(state.session);
        self.cards = (0..count).map(QuestionCard::new).collect();
    }
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let service = GeminiContentService::new(&config).context("创建 Gemini 服务失败")?;
        let controller = WorkbookController::new(Arc::new(service));
        let exporter = WorkbookExporter::new(&config.output_dir);
        let run_label = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        Ok(Self {
            controller,
            exporter,
            run_label,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let store = self.controller.store().clone();
        let watcher = spawn_figure_watcher(store.clone(), self.exporter.clone(), self.run_label.clone());
        let mut deck = CardDeck::default();
        let mut pass: Option<JoinHandle<PassSummary>> = None;

        render_stage(&store.snapshot(), &mut deck);
        prompt();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("读取终端输入失败")? {
            let state = store.snapshot();
            let command = parse_command(state.stage, &line);
            debug!("命令: {:?} (阶段: {})", command, state.stage);

            match command {
                Command::Quit => break,
                Command::Empty => {}
                Command::Unknown(hint) => println!("🤔 {}", hint),
                Command::Upload(path) => match read_image(&path).await {
                    Ok(image) => {
                        report(self.controller.select_image(image));
                        render_stage(&store.snapshot(), &mut deck);
                    }
                    Err(e) => println!("⚠️  {}", e),
                },
                Command::SetGrade(grade) => self.configure(self.controller.set_grade(grade), &mut deck),
                Command::SetDifficulty(difficulty) => {
                    self.configure(self.controller.set_difficulty(difficulty), &mut deck)
                }
                Command::SetStyle(style) => self.configure(self.controller.set_style(style), &mut deck),
                Command::Cancel => self.configure(self.controller.cancel_configuration(), &mut deck),
                Command::Go => {
                    print!("{}", views::render_analyzing(state.configuration.grade));
                    match self.controller.start_analysis().await {
                        Ok(handle) => pass = Some(handle),
                        Err(e) => debug!("分析未完成: {}", e),
                    }
                    render_stage(&store.snapshot(), &mut deck);
                }
                Command::Answer { index, value } => {
                    with_card(&state, &mut deck, index, |question, card| {
                        if !apply_answer(question, card, &value) {
                            println!("🤔 That answer does not fit problem {}.", index + 1);
                        }
                    });
                }
                Command::Submit(index) => {
                    with_card(&state, &mut deck, index, |_, card| {
                        if !card.submit() {
                            println!("🤔 Answer problem {} first.", index + 1);
                        }
                    });
                }
                Command::Reset(index) => with_card(&state, &mut deck, index, |_, card| card.reset()),
                Command::Show => render_stage(&state, &mut deck),
                Command::Export => {
                    if let Some(analysis) = &state.analysis {
                        match self
                            .exporter
                            .for_session(session_folder(&self.run_label, state.session))
                            .export_markdown(analysis, state.configuration.grade)
                            .await
                        {
                            Ok(path) => println!("📝 Workbook exported to {}", path.display()),
                            Err(e) => println!("⚠️  {}", e),
                        }
                    }
                }
                Command::Close => {
                    report(self.controller.close_workbook());
                    render_stage(&store.snapshot(), &mut deck);
                }
            }
            prompt();
        }

        if let Some(handle) = pass {
            if !handle.is_finished() {
                info!("⏹ 退出前停止插图生成");
                handle.abort();
            }
        }
        watcher.abort();
        info!("👋 再见");
        Ok(())
    }

    fn configure(&self, result: AppResult<()>, deck: &mut CardDeck) {
        report(result);
        render_stage(&self.controller.store().snapshot(), deck);
    }
}

/// 根据阶段渲染界面
fn render_stage(state: &AppState, deck: &mut CardDeck) {
    let view = match state.stage {
        WorkflowStage::UploadingInput => views::render_upload(state.error.as_deref()),
        WorkflowStage::SelectingConfiguration => views::render_configuration(
            state.pending_image.as_ref().map(|image| image.file_name.as_str()),
            &state.configuration,
        ),
        WorkflowStage::Analyzing => views::render_analyzing(state.configuration.grade),
        WorkflowStage::ShowingResults => match &state.analysis {
            Some(analysis) => {
                deck.sync(state);
                views::render_results(analysis, state.configuration.grade, &deck.cards)
            }
            None => String::new(),
        },
    };
    print!("{}", view);
}

/// 操作一张答题卡片后重新显示它
fn with_card(
    state: &AppState,
    deck: &mut CardDeck,
    index: usize,
    f: impl FnOnce(&Question, &mut QuestionCard),
) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    deck.sync(state);
    match (analysis.questions.get(index), deck.cards.get_mut(index)) {
        (Some(question), Some(card)) => {
            f(question, card);
            println!("{}", card.render(question));
        }
        _ => println!("🤔 There is no problem {}.", index + 1),
    }
}

/// 把一条 `answer` 命令应用到答题卡片
///
/// 简答内容相当于在输入框中输入后按下回车，直接提交
fn apply_answer(question: &Question, card: &mut QuestionCard, raw: &str) -> bool {
    match resolve_answer(question, raw) {
        Some(AnswerInput::Option(option)) => card.select_option(question, &option),
        Some(AnswerInput::Text(text)) => card.set_short_answer(question, &text) && card.press_enter(),
        None => false,
    }
}

fn report(result: AppResult<()>) {
    if let Err(e) = result {
        warn!("操作被拒绝: {}", e);
        println!("⚠️  {}", e);
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// 练习册会话的输出子目录名
fn session_folder(run_label: &str, session: SessionId) -> String {
    format!("workbook_{}_{}", run_label, session.value())
}

/// 启动插图观察任务
///
/// 每次状态变化时检查当前会话的题目，新到达的插图保存到输出目录，失败的题目提示占位图
fn spawn_figure_watcher(store: AppStore, exporter: WorkbookExporter, run_label: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = store.subscribe();
        let mut session = None;
        let mut session_exporter = exporter.clone();
        let mut announced: HashSet<String> = HashSet::new();

        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.stage != WorkflowStage::ShowingResults {
                continue;
            }
            if session != Some(state.session) {
                session = Some(state.session);
                session_exporter = exporter.for_session(session_folder(&run_label, state.session));
                announced.clear();
            }
            if let Some(analysis) = &state.analysis {
                announce_figures(analysis, &session_exporter, &mut announced).await;
            }
        }
    })
}

async fn announce_figures(analysis: &AnalysisResult, exporter: &WorkbookExporter, announced: &mut HashSet<String>) {
    for (index, question) in analysis.questions.iter().enumerate() {
        if announced.contains(&question.id) {
            continue;
        }
        match &question.illustration {
            IllustrationState::Pending => continue,
            IllustrationState::Ready(image) => match exporter.save_figure(index, image).await {
                Ok(path) => println!("\n🖼  Figure {} is ready: {}", index + 1, path.display()),
                Err(e) => warn!("保存第 {} 张插图失败: {}", index + 1, e),
            },
            IllustrationState::Unavailable => {
                println!("\n{} Figure {} could not be drawn.", PLACEHOLDER_GLYPH, index + 1)
            }
        }
        announced.insert(question.id.clone());
    }
}
