//! 配線: 標準アダプタで UseCase を組み立てる
//!
//! 設定ファイルが無くても動く部分（config init / path と logger）は App に、
//! 設定を読んでから組み立てる部分（プラットフォーム・ステージング）は Services に分ける。

use std::path::PathBuf;
use std::sync::Arc;

use common::adapter::{
    FileJsonLog, StdClock, StdEnvResolver, StdFileSystem, StdIdGenerator, StderrLog,
    TeeLog,
};
use common::content::ContentManager;
use common::domain::Dirs;
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem, IdGenerator, Log};

use crate::adapter::{FileConfigRepository, StdPlatformFactory};
use crate::domain::ConduitConfig;
use crate::ports::outbound::{ConfigRepository, PlatformFactory};
use crate::usecase::{ConfigUseCase, ConnectUseCase, IssueUseCase, PageUseCase, StagingUseCase};

/// 配線で組み立てたポート群（main の Command ディスパッチで利用）
pub struct App {
    pub fs: Arc<dyn FileSystem>,
    pub id_gen: Arc<dyn IdGenerator>,
    pub dirs: Dirs,
    /// 構造化ログ（ファイルへ JSONL、-v 時は stderr にも）
    pub logger: Arc<dyn Log>,
    pub config_use_case: ConfigUseCase,
    config_repository: Arc<dyn ConfigRepository>,
}

/// 設定を読み込んだ後に使うユースケース群
pub struct Services {
    pub config: ConduitConfig,
    pub logger: Arc<dyn Log>,
    pub staging: Arc<StagingUseCase>,
    pub connect: ConnectUseCase,
    pub issues: Arc<IssueUseCase>,
    pub pages: Arc<PageUseCase>,
}

impl Services {
    pub fn new(
        config: ConduitConfig,
        factory: Arc<dyn PlatformFactory>,
        content: ContentManager,
        logger: Arc<dyn Log>,
    ) -> Self {
        let staging = Arc::new(StagingUseCase::new(Arc::new(content), Arc::clone(&logger)));
        Self {
            config,
            connect: ConnectUseCase::new(Arc::clone(&factory)),
            issues: Arc::new(IssueUseCase::new(Arc::clone(&factory), Arc::clone(&staging))),
            pages: Arc::new(PageUseCase::new(factory)),
            staging,
            logger,
        }
    }
}

impl App {
    /// config.json を読み、ステージングディレクトリと標準プラットフォームで Services を作る
    pub fn load_services(&self) -> Result<Services, Error> {
        let config = self.config_repository.load()?;
        let content_dir = resolve_content_dir(&self.dirs, config.content_dir.as_ref());
        let content = ContentManager::new(Arc::clone(&self.fs), Arc::clone(&self.id_gen), content_dir)?;
        let factory: Arc<dyn PlatformFactory> = Arc::new(StdPlatformFactory::new(
            config.clone(),
            Arc::clone(&self.logger),
        ));
        Ok(Services::new(config, factory, content, Arc::clone(&self.logger)))
    }
}

/// 相対指定は設定ディレクトリ基準。未指定なら `<config_dir>/content`
pub fn resolve_content_dir(dirs: &Dirs, configured: Option<&PathBuf>) -> PathBuf {
    match configured {
        Some(p) if p.is_absolute() => p.clone(),
        Some(p) => dirs.config_dir.join(p),
        None => dirs.default_content_dir(),
    }
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_conduit(verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let dirs = env_resolver.resolve_dirs()?;
    let file_log: Arc<dyn Log> = Arc::new(FileJsonLog::new(Arc::clone(&fs), dirs.log_file()));
    let logger: Arc<dyn Log> = if verbose {
        Arc::new(TeeLog::new(vec![file_log, Arc::new(StderrLog)]))
    } else {
        file_log
    };
    let id_gen: Arc<dyn IdGenerator> = Arc::new(StdIdGenerator::new(Arc::new(StdClock)));
    let config_repository: Arc<dyn ConfigRepository> =
        Arc::new(FileConfigRepository::new(Arc::clone(&fs), dirs.config_file()));
    Ok(App {
        fs,
        id_gen,
        dirs,
        logger,
        config_use_case: ConfigUseCase::new(Arc::clone(&config_repository)),
        config_repository,
    })
}
