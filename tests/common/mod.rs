#![allow(dead_code)]

pub mod action_dirs {
    use std::path::Path;
    use tempfile::TempDir;

    /// Creates an action directory holding the given `(file name, content)` pairs
    pub fn action_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), files);
        dir
    }

    pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
    }

    /// A minimal YAML definition with one path regex
    pub fn path_route(name: &str, pattern: &str) -> String {
        format!("name: {name}\nmatches:\n  preg: '{pattern}'\n")
    }
}

pub mod requests {
    use http::Method;
    use sifrouter::request::RequestContext;

    pub fn get(uri: &str) -> RequestContext {
        RequestContext::builder(Method::GET, uri)
            .host("www.example.com")
            .build()
    }

    pub fn get_on(host: &str, uri: &str) -> RequestContext {
        RequestContext::builder(Method::GET, uri).host(host).build()
    }

    pub fn post(uri: &str, form: &[(&str, &str)]) -> RequestContext {
        form.iter()
            .fold(
                RequestContext::builder(Method::POST, uri).host("www.example.com"),
                |b, (k, v)| b.form_param(k, *v),
            )
            .build()
    }
}

pub mod recording {
    use anyhow::anyhow;
    use serde_json::Value;
    use sifrouter::action::{Action, ActionContext, Next, UserData};
    use sifrouter::error::Hook;
    use sifrouter::registry::ActionRegistry;
    use sifrouter::router::RouteArgs;
    use std::sync::{Arc, Mutex};

    /// What an action saw when one of its hooks ran
    #[derive(Debug, Clone)]
    pub struct Event {
        pub action: String,
        pub hook: Hook,
        pub config: Option<String>,
        pub chain: Vec<String>,
        pub user_data: UserData,
        /// Values of the scripted `read` keys, fetched through `user_var`
        pub read: Vec<(String, Option<Value>)>,
        pub arg0: Option<String>,
    }

    pub type Log = Arc<Mutex<Vec<Event>>>;

    pub fn new_log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Hook calls as `action:hook` strings, in call order
    pub fn hooks(log: &Log) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .map(|e| format!("{}:{}", e.action, e.hook))
            .collect()
    }

    pub fn events_for(log: &Log, action: &str, hook: Hook) -> Vec<Event> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == action && e.hook == hook)
            .cloned()
            .collect()
    }

    /// Scripted behaviour of a recording action
    #[derive(Debug, Clone, Default)]
    pub struct Script {
        pub start: Next,
        pub logic: Next,
        pub fail: Option<Hook>,
        pub set: Vec<(String, Value)>,
        pub read: Vec<String>,
        pub forget: Vec<String>,
    }

    impl Script {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn start_to(mut self, next: &str) -> Self {
            self.start = Some(next.to_string());
            self
        }

        pub fn logic_to(mut self, next: &str) -> Self {
            self.logic = Some(next.to_string());
            self
        }

        pub fn fail_in(mut self, hook: Hook) -> Self {
            self.fail = Some(hook);
            self
        }

        pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
            self.set.push((key.to_string(), value.into()));
            self
        }

        pub fn read(mut self, key: &str) -> Self {
            self.read.push(key.to_string());
            self
        }

        pub fn forget(mut self, key: &str) -> Self {
            self.forget.push(key.to_string());
            self
        }
    }

    pub struct Recording {
        name: String,
        script: Script,
        log: Log,
    }

    impl Recording {
        fn record(
            &self,
            ctx: &ActionContext<'_>,
            hook: Hook,
            args: Option<&RouteArgs>,
        ) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(Event {
                action: self.name.clone(),
                hook,
                config: ctx.config().map(|c| c.name.clone()),
                chain: ctx.chain().to_vec(),
                user_data: ctx.user_data().clone(),
                read: self
                    .script
                    .read
                    .iter()
                    .map(|k| (k.clone(), ctx.user_var(k).cloned()))
                    .collect(),
                arg0: args.and_then(|a| a.get("0")).map(str::to_string),
            });
            if self.script.fail == Some(hook) {
                return Err(anyhow!("{} refused in {hook}", self.name));
            }
            Ok(())
        }
    }

    impl Action for Recording {
        fn init(&mut self, ctx: &mut ActionContext<'_>) -> anyhow::Result<()> {
            self.record(ctx, Hook::Init, None)
        }

        fn start(&mut self, ctx: &mut ActionContext<'_>) -> anyhow::Result<Next> {
            self.record(ctx, Hook::Start, None)?;
            Ok(self.script.start.clone())
        }

        fn logic(&mut self, ctx: &mut ActionContext<'_>, args: &RouteArgs) -> anyhow::Result<Next> {
            self.record(ctx, Hook::Logic, Some(args))?;
            for k in &self.script.forget {
                ctx.user_data_mut().remove(k);
            }
            for (k, v) in &self.script.set {
                ctx.set_user_var(k.clone(), v.clone());
            }
            Ok(self.script.logic.clone())
        }

        fn view(&mut self, ctx: &mut ActionContext<'_>, args: &RouteArgs) -> anyhow::Result<()> {
            self.record(ctx, Hook::View, Some(args))
        }

        fn stop(&mut self, ctx: &mut ActionContext<'_>, args: &RouteArgs) -> anyhow::Result<()> {
            self.record(ctx, Hook::Stop, Some(args))
        }
    }

    /// Registers a recording action under `name`
    pub fn register(registry: &mut ActionRegistry, log: &Log, name: &str, script: Script) {
        let log = Arc::clone(log);
        let action_name = name.to_string();
        registry.register(name, move || Recording {
            name: action_name.clone(),
            script: script.clone(),
            log: Arc::clone(&log),
        });
    }
}
