//! Dependency resolution and incremental compilation.
//!
//! [`build`] walks a descriptor and its dependencies depth-first:
//!
//! 1. parse the descriptor and expand its `files`, `watch` and `include`
//!    patterns relative to the descriptor's directory
//! 2. resolve every `library` and `submodule` dependency, collecting their
//!    exported include directories and object files
//! 3. compile whatever is stale into `build/<platform>/<configuration>/`
//! 4. for a project descriptor, link everything into its `output`
//!
//! Every path is resolved against the module directory, which is also the
//! working directory of the commands run for that module. The process working
//! directory is never changed.
//!
//! # Submodules
//!
//! - [`stale`] - timestamp comparisons

pub mod stale;
mod types;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::{BUILD_DIR, DEFAULT_COMPILER, LIBRARY_FILE, OBJECT_SUFFIX, PROJECT_FILE};
use crate::descriptor::{self, Descriptor, Property};
use crate::execute::{Runner, execute_all};
use crate::glob::{self, GlobError, Mode};
use crate::template::{Bindings, OBJECTS, OUT, Shape, Template};
use crate::util::{absolutize, command_path};

pub use types::*;

/// Build the module described by `descriptor` and everything it depends on.
///
/// Starts a fresh [`LinkAccumulator`], so independent calls never share
/// objects or linker flags.
pub fn build<R: Runner + ?Sized>(
  descriptor: &Path,
  options: &BuildOptions,
  runner: &mut R,
) -> Result<Resolved, BuildError> {
  let mut link = LinkAccumulator::new();
  let mut resolver = Resolver {
    options,
    runner,
    link: &mut link,
  };
  resolver.resolve(descriptor, None)
}

/// Returns true if `path` names a project descriptor.
pub fn is_project(path: &Path) -> bool {
  path
    .file_name()
    .is_some_and(|name| name.to_string_lossy().eq_ignore_ascii_case(PROJECT_FILE))
}

struct Resolver<'a, R: ?Sized> {
  options: &'a BuildOptions,
  runner: &'a mut R,
  link: &'a mut LinkAccumulator,
}

/// A parsed module with its patterns expanded.
struct Module {
  path: PathBuf,
  dir: PathBuf,
  name: String,
  descriptor: Descriptor,
  files: Vec<String>,
  watch: Vec<PathBuf>,
  includes: Vec<String>,
}

impl<R: Runner + ?Sized> Resolver<'_, R> {
  fn resolve(&mut self, path: &Path, inherited: Option<&str>) -> Result<Resolved, BuildError> {
    if !path.is_file() {
      return Err(BuildError::DescriptorNotFound(path.to_path_buf()));
    }
    let module = self.load(path)?;
    let project = is_project(&module.path);
    if project && module.descriptor.output.is_none() {
      return Err(BuildError::MissingOutput(module.path));
    }
    info!(module = %module.name, project, "resolving module");

    self.link.add_linker_flags(&module.descriptor.linker_flags);

    let mut includes = module.includes.clone();
    let mut commands = 0;
    let mut dependency_changed = false;
    let passed_down = module.descriptor.submodule_command.as_deref().or(inherited);

    for dependency in self.dependencies(&module) {
      if !dependency.is_file() {
        debug!(module = %module.name, dependency = ?dependency, "dependency descriptor missing, skipping");
        continue;
      }
      let resolved = self.resolve(&dependency, passed_down)?;
      includes.extend(resolved.includes.iter().map(|dir| command_path(dir)));
      self.link.add_objects(resolved.objects);
      commands += resolved.commands;
      dependency_changed |= !resolved.skipped;
    }

    let object_dir = Path::new(BUILD_DIR).join(self.options.selector.artifact_dir());
    let object_dir_abs = module.dir.join(&object_dir);
    fs::create_dir_all(&object_dir_abs).map_err(|e| BuildError::io(&object_dir_abs, e))?;

    let template = select_template(&module, inherited)?;
    let mut bindings = base_bindings(&module.descriptor);
    bindings
      .set("include", includes)
      .set("linkerFlags", self.link.linker_flags().iter().map(String::as_str));
    let force = self.options.rebuild || dependency_changed;

    let compiled = match template.shape() {
      Shape::PerFile => self.compile_each(&module, &template, bindings, &object_dir, force)?,
      Shape::Aggregate => self.compile_all(&module, &template, bindings, &object_dir, project, force)?,
    };
    if compiled > 0 {
      self.link.mark_changed();
    } else {
      debug!(module = %module.name, "objects up to date");
    }
    commands += compiled;

    let objects = list_objects(&object_dir_abs)?;

    if !project {
      if module.descriptor.output.is_some() {
        warn!(module = %module.name, "library declares an output, ignoring it");
      }
      let exported = match &module.descriptor.path {
        Some(path) => expand(&module.dir, std::slice::from_ref(path), Mode::Directories)?,
        None => module.includes,
      };
      return Ok(Resolved {
        includes: exported.iter().map(|dir| absolutize(&module.dir, dir)).collect(),
        objects,
        output: None,
        commands,
        skipped: commands == 0,
      });
    }

    let output = module.descriptor.output.clone().unwrap_or_default();
    let output_path = absolutize(&module.dir, &output);
    if template.shape() == Shape::PerFile {
      self.link.add_objects(objects.iter().cloned());
      commands += self.link_project(&module, &output, &output_path)?;
    }

    Ok(Resolved {
      includes: Vec::new(),
      objects,
      output: Some(output_path),
      commands,
      skipped: commands == 0,
    })
  }

  fn load(&self, path: &Path) -> Result<Module, BuildError> {
    let path = dunce::canonicalize(path).map_err(|e| BuildError::io(path, e))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = dir
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| dir.display().to_string());

    let descriptor = descriptor::parse_file(&path, &self.options.selector)?;
    let files = expand(&dir, &descriptor.files, Mode::Files)?;
    let watch = expand(&dir, &descriptor.watch, Mode::Files)?
      .iter()
      .map(|file| dir.join(file))
      .collect();
    let includes = expand(&dir, &descriptor.include, Mode::Directories)?;
    debug!(module = %name, files = files.len(), includes = includes.len(), "expanded patterns");

    Ok(Module {
      path,
      dir,
      name,
      descriptor,
      files,
      watch,
      includes,
    })
  }

  /// Descriptor paths of `library` and `submodule` dependencies, in that order.
  fn dependencies(&self, module: &Module) -> Vec<PathBuf> {
    let root = &self.options.library_root;
    let libraries = module
      .descriptor
      .library
      .iter()
      .map(|name| root.join(name).join(LIBRARY_FILE));
    let submodules = module.descriptor.submodule.iter().map(|name| {
      let local = module.dir.join(name).join(LIBRARY_FILE);
      if local.is_file() {
        local
      } else {
        root.join(name).join(LIBRARY_FILE)
      }
    });
    libraries.chain(submodules).collect()
  }

  /// Run a per-file template for every stale source.
  fn compile_each(
    &mut self,
    module: &Module,
    template: &Template,
    mut bindings: Bindings,
    object_dir: &Path,
    force: bool,
  ) -> Result<usize, BuildError> {
    let mut files = Vec::new();
    let mut outs = Vec::new();
    for file in &module.files {
      let object = object_dir.join(format!("{}{OBJECT_SUFFIX}", file_name(file)));
      let source = module.dir.join(file);
      let inputs = std::iter::once(&source).chain(&module.watch);
      if force || stale::outdated(&module.dir.join(&object), inputs) {
        files.push(file.clone());
        outs.push(command_path(&object));
      }
    }
    if files.is_empty() {
      return Ok(0);
    }

    info!(module = %module.name, stale = files.len(), total = module.files.len(), "compiling");
    bindings.set("files", files).set(OUT, outs);
    self.run(module, template, &bindings)
  }

  /// Run an aggregate template once if anything it covers changed.
  ///
  /// A library produces `<object dir>/<module name>.o`; a project produces
  /// its output directly, taking the accumulated objects as extra files.
  fn compile_all(
    &mut self,
    module: &Module,
    template: &Template,
    mut bindings: Bindings,
    object_dir: &Path,
    project: bool,
    force: bool,
  ) -> Result<usize, BuildError> {
    let mut files = module.files.clone();
    let (out, extra): (String, Vec<PathBuf>) = if project {
      let objects: Vec<PathBuf> = self.link.objects().map(Path::to_path_buf).collect();
      files.extend(objects.iter().map(|object| command_path(object)));
      (module.descriptor.output.clone().unwrap_or_default(), objects)
    } else {
      let object = object_dir.join(format!("{}{OBJECT_SUFFIX}", module.name));
      (command_path(&object), Vec::new())
    };

    let out_path = module.dir.join(&out);
    let inputs = module
      .files
      .iter()
      .map(|file| module.dir.join(file))
      .chain(module.watch.iter().cloned())
      .chain(extra);
    let relink = project && self.link.needs_relink();
    if !force && !relink && !stale::outdated(&out_path, inputs) {
      return Ok(0);
    }

    if let Some(parent) = out_path.parent() {
      fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    info!(module = %module.name, out = %out, "compiling");
    bindings.set("files", files).set(OUT, [out]);
    self.run(module, template, &bindings)
  }

  /// Link the accumulated objects into a project's output when needed.
  fn link_project(&mut self, module: &Module, output: &str, output_path: &Path) -> Result<usize, BuildError> {
    let relink = self.link.needs_relink() || stale::outdated(output_path, self.link.objects());
    if !relink {
      debug!(module = %module.name, output, "output up to date");
      return Ok(0);
    }

    if let Some(parent) = output_path.parent() {
      fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }

    let driver = cxx_counterpart(compiler(&module.descriptor));
    let template = Template::parse(&format!("@{driver} $objects -o $out $linkerFlags"));
    let objects: Vec<String> = self.link.objects().map(command_path).collect();
    let bindings = Bindings::new()
      .with(OBJECTS, objects)
      .with(OUT, [output])
      .with("linkerFlags", self.link.linker_flags().iter().map(String::as_str));

    info!(module = %module.name, output, "linking");
    self.run(module, &template, &bindings)
  }

  fn run(&mut self, module: &Module, template: &Template, bindings: &Bindings) -> Result<usize, BuildError> {
    let invocations = template.instantiate(bindings).map_err(|source| BuildError::Template {
      path: module.path.clone(),
      source,
    })?;
    execute_all(&mut *self.runner, &invocations, &module.dir).map_err(BuildError::from)
  }
}

/// Expand each pattern relative to `dir`, keeping pattern order.
fn expand(dir: &Path, patterns: &[String], mode: Mode) -> Result<Vec<String>, GlobError> {
  let mut result = Vec::new();
  for pattern in patterns {
    result.extend(glob::glob(dir, pattern, mode)?);
  }
  Ok(result)
}

/// Bind every descriptor property under its own name.
fn base_bindings(descriptor: &Descriptor) -> Bindings {
  let mut bindings = Bindings::new();
  for property in Property::ALL {
    bindings.set(property.name(), descriptor.values(property).iter().map(String::as_str));
  }
  bindings
}

/// Pick the compile template for a module.
///
/// The module's own `command` wins, then the nearest ancestor's
/// `submoduleCommand`, then the built-in per-file compiler invocation.
/// `$flags` is appended when the chosen template does not place it.
fn select_template(module: &Module, inherited: Option<&str>) -> Result<Template, BuildError> {
  let template = match module.descriptor.command.as_deref().or(inherited) {
    Some(text) if text.trim().is_empty() => return Err(BuildError::MissingCommand(module.path.clone())),
    Some(text) => Template::parse(text),
    None => {
      let cc = compiler(&module.descriptor);
      let all_c = !module.files.is_empty() && module.files.iter().all(|file| file.ends_with(".c"));
      let driver = if all_c { cc.to_string() } else { cxx_counterpart(cc) };
      Template::parse(&format!("*{driver} -c $files -o $out *-I$include"))
    }
  };

  Ok(if template.mentions(Property::Flags.name()) {
    template
  } else {
    template.append(Property::Flags.name())
  })
}

fn compiler(descriptor: &Descriptor) -> &str {
  descriptor.compiler.as_deref().unwrap_or(DEFAULT_COMPILER)
}

/// The C++ driver that belongs to a C compiler: `gcc` → `g++`,
/// `clang` → `clang++`, `cc` → `c++`.
pub fn cxx_counterpart(compiler: &str) -> String {
  match compiler.strip_suffix("cc") {
    Some(stem) if stem.is_empty() || stem.ends_with(['/', '\\']) => format!("{stem}c++"),
    Some(stem) => format!("{stem}++"),
    None => format!("{compiler}++"),
  }
}

fn file_name(path: &str) -> &str {
  path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Object files in `dir`, sorted, as absolute paths.
fn list_objects(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
  let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;
  let mut objects: Vec<PathBuf> = entries
    .filter_map(Result::ok)
    .map(|entry| entry.path())
    .filter(|path| path.is_file() && path.to_string_lossy().ends_with(OBJECT_SUFFIX))
    .collect();
  objects.sort();
  Ok(objects)
}
