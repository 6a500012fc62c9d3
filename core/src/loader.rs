#![deny(missing_docs)]

//! # Documentation Loader
//!
//! Discovers markdown files under a directory, extracts their endpoints and
//! merges everything into one [`DocumentationData`].
//!
//! - **cache**: Per-loader memoization keyed by file modification times.
//!
//! The general documentation file is read separately and exposed as
//! [`DocumentationData::general_docs`]. It never contributes to endpoint
//! descriptions.

pub mod cache;

use crate::error::{AppError, AppResult};
use crate::markdown::MarkdownExtractor;
use crate::models::{CodeLanguage, DocumentationData, EndpointDocumentation};
use cache::{CacheKey, DocumentationCache, Fingerprint};
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Text encoding of the markdown files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8, with an optional byte-order mark.
    #[default]
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// 7-bit ASCII.
    Ascii,
}

impl TextEncoding {
    /// Decodes file contents.
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, String> {
        match self {
            TextEncoding::Utf8 => {
                let text = String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))?;
                Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    String::from_utf8(bytes).map_err(|e| e.to_string())
                } else {
                    Err("non-ASCII byte in ASCII file".to_string())
                }
            }
        }
    }
}

impl FromStr for TextEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            other => Err(AppError::Config(format!("Unsupported encoding: '{}'", other))),
        }
    }
}

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Root of the documentation tree.
    pub docs_directory: PathBuf,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// File-name glob patterns.
    pub file_patterns: Vec<String>,
    /// Encoding used to decode files.
    pub encoding: TextEncoding,
    /// Memoize loads.
    pub cache_enabled: bool,
    /// How long a cached load stays valid.
    pub cache_ttl: Duration,
    /// Name of the general documentation file at the root.
    pub general_docs_file: String,
    /// Code sample languages to keep.
    pub supported_languages: Vec<CodeLanguage>,
}

impl LoaderConfig {
    /// Default settings for `docs_directory`.
    pub fn new(docs_directory: impl Into<PathBuf>) -> Self {
        Self {
            docs_directory: docs_directory.into(),
            ..Self::default()
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            docs_directory: PathBuf::from("docs"),
            recursive: true,
            file_patterns: vec!["*.md".to_string(), "*.markdown".to_string()],
            encoding: TextEncoding::Utf8,
            cache_enabled: true,
            cache_ttl: Duration::from_secs(3600),
            general_docs_file: "general_docs.md".to_string(),
            supported_languages: CodeLanguage::ALL.to_vec(),
        }
    }
}

/// Loads a documentation directory.
pub struct MarkdownDocumentationLoader {
    config: LoaderConfig,
    patterns: Vec<Pattern>,
    extractor: MarkdownExtractor,
    cache: DocumentationCache,
}

impl MarkdownDocumentationLoader {
    /// Creates a loader. Fails if the directory does not exist or a pattern is invalid.
    pub fn new(config: LoaderConfig) -> AppResult<Self> {
        if !config.docs_directory.is_dir() {
            return Err(AppError::Load(
                config.docs_directory.clone(),
                "Documentation directory does not exist".to_string(),
            ));
        }
        let patterns = config
            .file_patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| AppError::Config(format!("Invalid file pattern '{}': {}", p, e)))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            extractor: MarkdownExtractor::new(config.supported_languages.clone()),
            cache: DocumentationCache::new(config.cache_ttl),
            patterns,
            config,
        })
    }

    /// Loader settings.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads (or returns the cached) documentation aggregate.
    ///
    /// With caching enabled, repeated calls return the same `Arc` until a file
    /// changes, the TTL expires or [`clear_cache`](Self::clear_cache) is called.
    pub fn load_documentation(&self) -> AppResult<Arc<DocumentationData>> {
        let files = self.markdown_files()?;
        if !self.config.cache_enabled {
            return self.load_from(&files).map(Arc::new);
        }
        let key = CacheKey {
            directory: self.config.docs_directory.clone(),
            recursive: self.config.recursive,
        };
        let fingerprint = Fingerprint::capture(&files)?;
        self.cache
            .get_or_load(&key, &fingerprint, || self.load_from(&files))
    }

    /// Forgets cached loads.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Every matching file, general docs included, in a stable order.
    pub fn markdown_files(&self) -> AppResult<Vec<PathBuf>> {
        let root = &self.config.docs_directory;
        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                AppError::Load(path, e.to_string())
            })?;
            if entry.file_type().is_file() && self.matches_pattern(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn matches_pattern(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.patterns.iter().any(|p| p.matches(name)))
    }

    /// Reads and decodes one file.
    pub fn read_file(&self, path: &Path) -> AppResult<String> {
        let bytes =
            std::fs::read(path).map_err(|e| AppError::Load(path.to_path_buf(), e.to_string()))?;
        self.config
            .encoding
            .decode(bytes)
            .map_err(|msg| AppError::Load(path.to_path_buf(), msg))
    }

    /// Extracts the endpoints of a single file.
    pub fn parse_file(&self, path: &Path) -> AppResult<Vec<EndpointDocumentation>> {
        let text = self.read_file(path)?;
        Ok(self.extractor.extract(&text).endpoints)
    }

    fn general_docs_path(&self) -> PathBuf {
        self.config
            .docs_directory
            .join(&self.config.general_docs_file)
    }

    fn load_from(&self, files: &[PathBuf]) -> AppResult<DocumentationData> {
        let started = Instant::now();
        let general_path = self.general_docs_path();
        let mut data = DocumentationData::default();

        for file in files {
            let text = self.read_file(file)?;
            if *file == general_path {
                data.general_docs = Some(text);
                continue;
            }

            let extraction = self.extractor.extract(&text);
            log::debug!(
                "Parsed {} endpoint(s) from {}",
                extraction.endpoints.len(),
                file.display()
            );
            for (key, value) in extraction.metadata {
                data.metadata.entry(key).or_insert(value);
            }
            for (tag, text) in extraction.tag_descriptions {
                data.tag_descriptions.entry(tag).or_insert(text);
            }
            for mut issue in extraction.issues {
                issue.file_path = Some(file.clone());
                data.stats.validation_errors.push(issue);
            }
            data.endpoints.extend(extraction.endpoints);
            data.global_examples.extend(extraction.global_examples);
            data.stats.total_files += 1;
        }

        let languages: BTreeSet<CodeLanguage> = data
            .endpoints
            .iter()
            .flat_map(|e| e.code_samples.iter())
            .chain(data.global_examples.iter())
            .map(|s| s.language)
            .collect();

        data.stats.total_endpoints = data.endpoints.len();
        data.stats.total_code_samples = data
            .endpoints
            .iter()
            .map(|e| e.code_samples.len())
            .sum::<usize>()
            + data.global_examples.len();
        data.stats.languages_found = languages.into_iter().collect();
        data.stats.load_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        log::info!(
            "Loaded {} endpoint(s) from {} file(s) in {}",
            data.stats.total_endpoints,
            data.stats.total_files,
            self.config.docs_directory.display()
        );
        Ok(data)
    }
}
