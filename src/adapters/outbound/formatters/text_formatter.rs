use crate::ports::outbound::ModelFormatter;
use crate::resolution::domain::{ApplicationModel, DependencyFlags, ResolvedDependency};
use crate::shared::Result;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// TextFormatter adapter rendering a human-readable listing of the model
///
/// Dependencies are grouped by classpath. Colors are only emitted when
/// requested, so the output can be piped or written to a file.
pub struct TextFormatter {
    colored: bool,
}

impl TextFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn section(&self, out: &mut String, title: &str, deps: &[&ResolvedDependency]) {
        if deps.is_empty() {
            return;
        }
        let heading = format!("{} ({})", title, deps.len());
        if self.colored {
            let _ = writeln!(out, "\n{}", heading.bold());
        } else {
            let _ = writeln!(out, "\n{}", heading);
        }
        for dep in deps {
            let _ = writeln!(out, "  {}", self.line(dep));
        }
    }

    fn line(&self, dep: &ResolvedDependency) -> String {
        let coords = dep.coords().to_compact_string();
        let flags = dep
            .flags()
            .names()
            .into_iter()
            .filter(|n| !matches!(*n, "runtime-cp" | "deployment-cp"))
            .collect::<Vec<_>>()
            .join(", ");
        let scope = dep.scope().to_string();

        if !self.colored {
            return if flags.is_empty() {
                format!("{} ({})", coords, scope)
            } else {
                format!("{} ({}) [{}]", coords, scope, flags)
            };
        }
        let coords = if dep.is_runtime_extension() {
            coords.green().to_string()
        } else if dep.is_flag_set(DependencyFlags::WORKSPACE_MODULE) {
            coords.cyan().to_string()
        } else {
            coords
        };
        if flags.is_empty() {
            format!("{} {}", coords, scope.dimmed())
        } else {
            format!("{} {} {}", coords, scope.dimmed(), format!("[{}]", flags).yellow())
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ModelFormatter for TextFormatter {
    fn format(&self, model: &ApplicationModel) -> Result<String> {
        let mut out = String::new();
        let app = model.app_artifact().coords().to_compact_string();
        if self.colored {
            let _ = writeln!(out, "Application {} ({} mode)", app.bold(), model.mode());
        } else {
            let _ = writeln!(out, "Application {} ({} mode)", app, model.mode());
        }

        let runtime: Vec<_> = model.runtime_dependencies().collect();
        let deployment: Vec<_> = model.deployment_only_dependencies().collect();
        let compile_only: Vec<_> = model
            .compile_only_dependencies()
            .filter(|d| !d.is_runtime_cp() && !d.is_deployment_cp())
            .collect();
        self.section(&mut out, "Runtime classpath", &runtime);
        self.section(&mut out, "Deployment only", &deployment);
        self.section(&mut out, "Compile only", &compile_only);

        let reloadable = model.reloadable_workspace_modules();
        if !reloadable.is_empty() {
            let _ = writeln!(out, "\nReloadable workspace modules ({})", reloadable.len());
            for key in reloadable {
                let _ = writeln!(out, "  {}", key);
            }
        }

        let platforms = model.platform_imports();
        for platform in platforms.platforms() {
            for stream in platform.streams() {
                for release in stream.releases() {
                    let _ = writeln!(
                        out,
                        "\nPlatform {} stream {} release {}",
                        platform.key(),
                        stream.id(),
                        release.version()
                    );
                }
            }
        }
        if let Some(report) = platforms.misalignment_report() {
            if self.colored {
                let _ = writeln!(out, "\n{}\n{}", "Platform misalignment".red().bold(), report);
            } else {
                let _ = writeln!(out, "\nPlatform misalignment\n{}", report);
            }
        }
        Ok(out)
    }
}
