//! Generator registry and the collaborators generators are built from.

mod image;
mod inputs;
mod text;

pub use image::{ClusterImageGenerator, ProductImageGenerator, ProductPoolGenerator};
pub use text::{HeaderGenerator, MainTextGenerator, PairedCopyGenerator};

use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_error::{ConfigError, TesseraResult};
use tessera_interface::{
    BackgroundRemover, Capability, Generator, ImageBackend, ImageFetcher, MediaUploader,
    OutputMode, TextBackend,
};
use tessera_pipeline::{ProductLookup, PromptSet, StagedTextPipeline};
use tessera_rate_limit::{BackoffPolicy, PipelineSettings};

/// Collaborators handed to text generators.
#[derive(Clone)]
pub struct TextServices {
    backend: Arc<dyn TextBackend>,
    prompts: PromptSet,
    settings: PipelineSettings,
    backoff: BackoffPolicy,
}

impl TextServices {
    /// Text services with bundled prompts, default pipeline settings and the
    /// default backoff policy.
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self {
            backend,
            prompts: PromptSet::bundled(),
            settings: PipelineSettings::default(),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Use a different prompt set.
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Use different pipeline settings.
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Retry rate-limited backend calls on `backoff`.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Staged pipeline over these services.
    pub fn pipeline(&self) -> StagedTextPipeline {
        StagedTextPipeline::new(self.backend.clone())
            .with_prompts(self.prompts.clone())
            .with_settings(self.settings.clone())
            .with_backoff(self.backoff)
    }

    /// Product-name lookup over the same backend.
    pub fn product_lookup(&self) -> ProductLookup {
        ProductLookup::new(self.backend.clone()).with_backoff(self.backoff)
    }
}

/// Collaborators handed to image generators.
#[derive(Clone)]
pub struct ImageServices {
    images: Arc<dyn ImageBackend>,
    remover: Arc<dyn BackgroundRemover>,
    uploader: Arc<dyn MediaUploader>,
    fetcher: Arc<dyn ImageFetcher>,
    backoff: BackoffPolicy,
}

impl ImageServices {
    /// Image services with the default backoff policy.
    pub fn new(
        images: Arc<dyn ImageBackend>,
        remover: Arc<dyn BackgroundRemover>,
        uploader: Arc<dyn MediaUploader>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            images,
            remover,
            uploader,
            fetcher,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Retry rate-limited calls on `backoff`.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Everything a generator might need. Either half may be absent.
#[derive(Clone, Default)]
pub struct Services {
    text: Option<TextServices>,
    image: Option<ImageServices>,
}

impl Services {
    /// Services with both halves.
    pub fn new(text: TextServices, image: ImageServices) -> Self {
        Self {
            text: Some(text),
            image: Some(image),
        }
    }

    /// Services for text generators only.
    pub fn text_only(text: TextServices) -> Self {
        Self {
            text: Some(text),
            image: None,
        }
    }

    /// Add or replace the text half.
    pub fn with_text(mut self, text: TextServices) -> Self {
        self.text = Some(text);
        self
    }

    /// Add or replace the image half.
    pub fn with_image(mut self, image: ImageServices) -> Self {
        self.image = Some(image);
        self
    }

    /// Text half, if configured.
    pub fn text(&self) -> Option<&TextServices> {
        self.text.as_ref()
    }

    /// Image half, if configured.
    pub fn image(&self) -> Option<&ImageServices> {
        self.image.as_ref()
    }
}

/// Constructor stored in the registry.
pub type GeneratorFactory = Arc<dyn Fn(&Services) -> TesseraResult<Box<dyn Generator>> + Send + Sync>;

/// Registry entry description.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct GeneratorInfo {
    /// Source identifier
    name: String,
    /// Collaborators required
    #[getter(copy)]
    capability: Capability,
    /// Output shape outside batch mode
    #[getter(copy)]
    output_mode: OutputMode,
    /// One-line description
    description: String,
    /// Input keys the generator reads
    inputs: Vec<String>,
}

struct Entry {
    info: GeneratorInfo,
    factory: GeneratorFactory,
}

/// Source identifier → generator constructor.
///
/// Built once at startup. Lookups of unknown identifiers are configuration
/// errors.
///
/// # Examples
///
/// ```
/// use tessera_engine::GeneratorRegistry;
/// use tessera_interface::Capability;
///
/// let registry = GeneratorRegistry::builtin();
/// assert!(registry.contains("text.header"));
/// assert_eq!(registry.info("image.cluster").unwrap().capability(), Capability::Image);
/// assert!(!registry.contains("text.nope"));
/// ```
pub struct GeneratorRegistry {
    entries: BTreeMap<String, Entry>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in generator.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_text(
            HeaderGenerator::NAME,
            OutputMode::Values,
            "Topic name in upper case",
            &[],
            |_| Box::new(HeaderGenerator),
        );
        registry.register_text(
            MainTextGenerator::NAME,
            OutputMode::Values,
            "Main text lines from main_lines or the staged text pipeline",
            &[inputs::MAIN_LINES, inputs::PRODUCT_NAMES, inputs::PRODUCT_URLS],
            |text| Box::new(MainTextGenerator::new(text)),
        );
        registry.register_text(
            PairedCopyGenerator::NAME,
            OutputMode::Values,
            "Header and main text pairs from the staged text pipeline",
            &[],
            |text| Box::new(PairedCopyGenerator::new(text)),
        );
        registry.register_image(
            ClusterImageGenerator::NAME,
            OutputMode::Values,
            "One composed image of 1-8 products",
            &[
                inputs::PRODUCT_IMAGE_URLS,
                inputs::ASPECT_RATIO,
                inputs::IS_PEOPLE_MODE,
            ],
            |image| Box::new(ClusterImageGenerator::new(image)),
        );
        registry.register_image(
            ProductImageGenerator::NAME,
            OutputMode::Values,
            "One cleaned product image selected by input_index",
            &[
                inputs::PRODUCT_IMAGE_URLS,
                inputs::INPUT_INDEX,
                inputs::ASPECT_RATIO,
            ],
            |image| Box::new(ProductImageGenerator::new(image)),
        );
        registry.register_image(
            ProductPoolGenerator::NAME,
            OutputMode::Pool,
            "Pool of cleaned product images, one per URL",
            &[inputs::PRODUCT_IMAGE_URLS, inputs::ASPECT_RATIO],
            |image| Box::new(ProductPoolGenerator::new(image)),
        );
        registry
    }

    /// Register a generator constructor.
    ///
    /// Re-registering a name replaces the previous entry.
    #[tracing::instrument(skip(self, description, inputs, factory), fields(generator = name))]
    pub fn register(
        &mut self,
        name: &str,
        capability: Capability,
        output_mode: OutputMode,
        description: &str,
        inputs: &[&str],
        factory: GeneratorFactory,
    ) {
        if self.entries.contains_key(name) {
            tracing::warn!("Generator already registered, overwriting previous registration");
        } else {
            tracing::debug!("Registering generator");
        }
        let info = GeneratorInfo {
            name: name.to_string(),
            capability,
            output_mode,
            description: description.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        };
        self.entries
            .insert(name.to_string(), Entry { info, factory });
    }

    /// Register a generator built from text services.
    pub fn register_text<F>(
        &mut self,
        name: &str,
        output_mode: OutputMode,
        description: &str,
        inputs: &[&str],
        build: F,
    ) where
        F: Fn(&TextServices) -> Box<dyn Generator> + Send + Sync + 'static,
    {
        let owner = name.to_string();
        let factory: GeneratorFactory = Arc::new(move |services: &Services| -> TesseraResult<Box<dyn Generator>> {
            let text = services.text().ok_or_else(|| {
                ConfigError::new(format!("Generator '{}' needs text services", owner))
            })?;
            Ok(build(text))
        });
        self.register(name, Capability::Text, output_mode, description, inputs, factory);
    }

    /// Register a generator built from image services.
    pub fn register_image<F>(
        &mut self,
        name: &str,
        output_mode: OutputMode,
        description: &str,
        inputs: &[&str],
        build: F,
    ) where
        F: Fn(&ImageServices) -> Box<dyn Generator> + Send + Sync + 'static,
    {
        let owner = name.to_string();
        let factory: GeneratorFactory = Arc::new(move |services: &Services| -> TesseraResult<Box<dyn Generator>> {
            let image = services.image().ok_or_else(|| {
                ConfigError::new(format!("Generator '{}' needs image services", owner))
            })?;
            Ok(build(image))
        });
        self.register(name, Capability::Image, output_mode, description, inputs, factory);
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Description of `name`.
    pub fn info(&self, name: &str) -> Option<&GeneratorInfo> {
        self.entries.get(name).map(|entry| &entry.info)
    }

    /// Every registered generator, sorted by name.
    pub fn list(&self) -> Vec<GeneratorInfo> {
        self.entries.values().map(|entry| entry.info.clone()).collect()
    }

    /// Instantiate the generator for `name`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown names or missing services.
    #[tracing::instrument(skip(self, services), fields(generator = name))]
    pub fn create(&self, name: &str, services: &Services) -> TesseraResult<Box<dyn Generator>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ConfigError::new(format!("Unknown generator: {}", name)))?;
        (entry.factory)(services)
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
