//! Where generated classes live: namespaces and file paths.
//!
//! Models live under `<app-dir>[/Module/<M>]/Model/<Entity>/` in the namespace
//! `<App>[\Module\<M>]\Model\<Entity>`. The repository registry is always the
//! application-wide `<app-dir>/Model/Orm.php`.

use camino::Utf8PathBuf;

use crate::annotation::Reference;

/// Namespace and directory conventions of the target application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLayout {
    /// Root namespace, e.g. `App`
    pub app_namespace: String,
    /// Root source directory, e.g. `app`
    pub app_dir: Utf8PathBuf,
    /// Optional module the generated classes belong to
    pub module: Option<String>,
}

impl Default for ModelLayout {
    fn default() -> Self {
        Self::new("App", "app")
    }
}

impl ModelLayout {
    pub fn new(app_namespace: impl Into<String>, app_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            app_namespace: app_namespace.into().trim_matches('\\').to_string(),
            app_dir: app_dir.into(),
            module: None,
        }
    }

    pub fn with_module(mut self, module: Option<String>) -> Self {
        self.module = module;
        self
    }

    fn base_namespace(&self) -> String {
        match &self.module {
            Some(module) => format!("{}\\Module\\{module}", self.app_namespace),
            None => self.app_namespace.clone(),
        }
    }

    fn base_dir(&self) -> Utf8PathBuf {
        match &self.module {
            Some(module) => self.app_dir.join("Module").join(module),
            None => self.app_dir.clone(),
        }
    }

    /// `App\Model\Article`
    pub fn model_namespace(&self, entity: &str) -> String {
        format!("{}\\Model\\{entity}", self.base_namespace())
    }

    /// `App\Model\Article\Article`
    pub fn entity_class(&self, entity: &str) -> Reference {
        Reference::new(format!("{}\\{entity}", self.model_namespace(entity)))
    }

    /// `App\Model\Article\ArticleRepository`
    pub fn repository_class(&self, entity: &str) -> Reference {
        Reference::new(format!("{}\\{entity}Repository", self.model_namespace(entity)))
    }

    /// `App\Model`, the namespace of the registry class.
    pub fn registry_namespace(&self) -> String {
        format!("{}\\Model", self.app_namespace)
    }

    /// `App\Lib`
    pub fn service_namespace(&self) -> String {
        format!("{}\\Lib", self.base_namespace())
    }

    /// `app/Model/Article`
    pub fn model_dir(&self, entity: &str) -> Utf8PathBuf {
        self.base_dir().join("Model").join(entity)
    }

    pub fn entity_path(&self, entity: &str) -> Utf8PathBuf {
        self.model_dir(entity).join(format!("{entity}.php"))
    }

    pub fn mapper_path(&self, entity: &str) -> Utf8PathBuf {
        self.model_dir(entity).join(format!("{entity}Mapper.php"))
    }

    pub fn repository_path(&self, entity: &str) -> Utf8PathBuf {
        self.model_dir(entity).join(format!("{entity}Repository.php"))
    }

    pub fn conventions_path(&self, entity: &str) -> Utf8PathBuf {
        self.model_dir(entity).join(format!("{entity}Conventions.php"))
    }

    /// `app/Model/Orm.php`
    pub fn registry_path(&self) -> Utf8PathBuf {
        self.app_dir.join("Model").join("Orm.php")
    }

    /// `app/Lib/<Name>.php`
    pub fn service_path(&self, name: &str) -> Utf8PathBuf {
        self.base_dir().join("Lib").join(format!("{name}.php"))
    }
}
