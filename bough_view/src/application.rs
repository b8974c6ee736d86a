// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The application: owner of every view and window.

use core::any::Any;
use core::fmt;
use std::collections::VecDeque;
use std::sync::Arc;

use bough_cache::{DownloadCache, DownloadConfig, Fetch, Pending, UnsupportedFetch};
use kurbo::{Rect, Vec2};

use crate::arena::Arena;
use crate::message::Router;
use crate::node::{Provision, ViewNode};
use crate::platform::{HeadlessPlatform, Platform};
use crate::render::RenderTexture;
use crate::resource::ResourceManager;
use crate::view::{Deferred, PlainView, View, ViewCx};
use crate::window::Window;
use crate::{Error, ViewFlags, ViewId, WindowId};

/// Application-wide configuration.
///
/// Fill in the fields you care about and take the rest from [`Default`]:
///
/// ```
/// use bough_view::ApplicationConfig;
/// use bough_cache::DownloadConfig;
///
/// let config = ApplicationConfig {
///     download: DownloadConfig { max_bytes: Some(8 << 20) },
///     ..ApplicationConfig::default()
/// };
/// assert!(config.purge_downloads_on_low_memory);
/// ```
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Download cache configuration, including its automatic purge ceiling.
    pub download: DownloadConfig,
    /// Drop every idle cached download when [`Application::low_memory`] is called.
    pub purge_downloads_on_low_memory: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            purge_downloads_on_low_memory: true,
        }
    }
}

/// Owner of every view and window, and of process-wide services.
///
/// All tree, focus, dispatch and messaging APIs take `&mut self` and run on the thread that
/// owns the application. Only the caches it hands out ([`DownloadCache`] and the per-window
/// resource caches) are shared with other threads.
///
/// ```
/// use bough_view::{Application, Relation};
///
/// let mut app = Application::default();
/// let a = app.create_plain_view();
/// let b = app.create_plain_view();
/// let c = app.create_plain_view();
/// app.add_subview(a, b);
/// app.add_subview(a, c);
///
/// assert!(app.has_relation(a, Relation::Ancestor, c));
/// assert!(app.has_relation(b, Relation::Sibling, c));
/// assert!(!app.has_relation(a, Relation::Sibling, c));
/// ```
pub struct Application {
    config: ApplicationConfig,
    pub(crate) views: Arena<ViewId, ViewNode>,
    pub(crate) windows: Arena<WindowId, Window>,
    pub(crate) router: Router,
    /// Newest first.
    pub(crate) provisions: Vec<Provision>,
    pub(crate) downloads: DownloadCache,
    pub(crate) resources: Option<Box<dyn ResourceManager>>,
    pub(crate) platform: Box<dyn Platform>,
    /// Render textures dropped since the last frame, handed back to the next renderer.
    pub(crate) released_textures: Vec<RenderTexture>,
    deferred: VecDeque<Deferred>,
    flushing: bool,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("views", &self.views.len())
            .field("windows", &self.windows.len())
            .field("downloads", &self.downloads)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(ApplicationConfig::default())
    }
}

impl Application {
    /// Create an application on a [`HeadlessPlatform`] whose downloads always fail.
    ///
    /// Use the `with_*` builders to plug in a real platform, network layer and resources.
    pub fn new(config: ApplicationConfig) -> Self {
        let downloads = DownloadCache::new(Arc::new(UnsupportedFetch), config.download.clone());
        Self {
            config,
            views: Arena::default(),
            windows: Arena::default(),
            router: Router::default(),
            provisions: Vec::new(),
            downloads,
            resources: None,
            platform: Box::new(HeadlessPlatform::new()),
            released_textures: Vec::new(),
            deferred: VecDeque::new(),
            flushing: false,
        }
    }

    /// Use `platform` for native windows.
    pub fn with_platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Box::new(platform);
        self
    }

    /// Perform downloads with `fetch`, on worker threads.
    pub fn with_fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.downloads = DownloadCache::new(fetch, self.config.download.clone());
        self
    }

    /// Use an existing download cache, for example one sharing transfers with another
    /// application or driven by a custom spawner.
    pub fn with_download_cache(mut self, downloads: DownloadCache) -> Self {
        self.downloads = downloads;
        self
    }

    /// Load named resources through `resources`.
    pub fn with_resource_manager(mut self, resources: impl ResourceManager + 'static) -> Self {
        self.resources = Some(Box::new(resources));
        self
    }

    /// The configuration this application was created with.
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    // --- Views ---

    /// Create a detached view with the given behavior.
    pub fn create_view(&mut self, behavior: impl View) -> ViewId {
        self.create_boxed_view(Box::new(behavior))
    }

    /// Create a detached view from an already boxed behavior.
    pub fn create_boxed_view(&mut self, behavior: Box<dyn View>) -> ViewId {
        self.views.insert(ViewNode::new(behavior))
    }

    /// Create a detached view with default behavior.
    pub fn create_plain_view(&mut self) -> ViewId {
        self.create_view(PlainView)
    }

    /// Returns true if `id` refers to a live view.
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.views.contains(id)
    }

    /// Number of live views, including window content views.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Destroy a view.
    ///
    /// The view's subviews are detached (not destroyed), the view is removed from its
    /// superview, which clears focus from it first, it is unlinked from the focus ring and
    /// its listeners and provisions are dropped.
    pub fn destroy_view(&mut self, id: ViewId) -> Result<(), Error> {
        if !self.views.contains(id) {
            return Err(Error::UnknownView(id));
        }
        if self.windows.iter().any(|(_, w)| w.content == id) {
            return Err(Error::ContentView(id));
        }

        self.unlink_focus_ring(id);
        self.remove_subviews_impl(id);
        if let Some(superview) = self.superview(id) {
            self.remove_subview_impl(superview, id);
        }
        debug_assert!(
            self.views.get(id).is_some_and(|n| n.window.is_none()),
            "a detached view has no window"
        );
        self.router.unregister_view(id);
        self.release_render_texture(id);
        self.views.remove(id);
        tracing::trace!(?id, "destroyed view");
        self.flush();
        Ok(())
    }

    /// The behavior of `id`, if it has type `T`.
    ///
    /// Returns `None` while one of the view's own hooks is running.
    pub fn behavior<T: Any>(&self, id: ViewId) -> Option<&T> {
        let behavior: &dyn View = self.views.get(id)?.behavior.as_deref()?;
        let any: &dyn Any = behavior;
        any.downcast_ref::<T>()
    }

    /// Mutable access to the behavior of `id`, if it has type `T`.
    pub fn behavior_mut<T: Any>(&mut self, id: ViewId) -> Option<&mut T> {
        let behavior: &mut dyn View = self.views.get_mut(id)?.behavior.as_deref_mut()?;
        let any: &mut dyn Any = behavior;
        any.downcast_mut::<T>()
    }

    /// The view's name, if one was set.
    pub fn name(&self, id: ViewId) -> Option<&str> {
        self.views.get(id)?.name.as_deref()
    }

    /// Name a view, for debugging and lookup.
    pub fn set_name(&mut self, id: ViewId, name: impl Into<String>) {
        if let Some(node) = self.views.get_mut(id) {
            node.name = Some(name.into());
        }
    }

    /// The first live view named `name`, in creation-slot order.
    pub fn view_named(&self, name: &str) -> Option<ViewId> {
        self.views
            .iter()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// The view's flags; empty for stale ids.
    pub fn flags(&self, id: ViewId) -> ViewFlags {
        self.views.get(id).map_or(ViewFlags::empty(), |n| n.flags)
    }

    pub(crate) fn has_flag(&self, id: ViewId, flag: ViewFlags) -> bool {
        self.flags(id).contains(flag)
    }

    fn set_flag(&mut self, id: ViewId, flag: ViewFlags, on: bool) {
        if let Some(node) = self.views.get_mut(id) {
            node.flags.set(flag, on);
        }
    }

    /// The view's bounds in its superview's coordinates; zero for stale ids.
    pub fn bounds(&self, id: ViewId) -> Rect {
        self.views.get(id).map_or(Rect::ZERO, |n| n.bounds)
    }

    /// The view's render scale.
    pub fn scale(&self, id: ViewId) -> Vec2 {
        self.views.get(id).map_or(Vec2::new(1.0, 1.0), |n| n.scale)
    }

    /// Set the view's render scale; a scale of 2 draws the view at twice its size.
    pub fn set_scale(&mut self, id: ViewId, scale: Vec2) {
        if let Some(node) = self.views.get_mut(id) {
            node.scale = scale;
        }
        if let Some(superview) = self.superview(id) {
            self.invalidate_render_cache(superview);
        }
    }

    /// Returns true if the view's own visibility flag is set.
    pub fn is_visible(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::VISIBLE)
    }

    /// Whether the view receives pointer input.
    pub fn intercepts_interactions(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::INTERCEPTS)
    }

    /// Set whether the view receives pointer input.
    pub fn set_intercepts_interactions(&mut self, id: ViewId, on: bool) {
        self.set_flag(id, ViewFlags::INTERCEPTS, on);
    }

    /// Whether subviews are offered pointer input.
    pub fn children_intercept_interactions(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::CHILDREN_INTERCEPT)
    }

    /// Set whether subviews are offered pointer input.
    pub fn set_children_intercept_interactions(&mut self, id: ViewId, on: bool) {
        self.set_flag(id, ViewFlags::CHILDREN_INTERCEPT, on);
    }

    /// Whether subviews are clipped to this view's bounds.
    pub fn clips_to_bounds(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::CLIPS_TO_BOUNDS)
    }

    /// Set whether subviews are clipped to this view's bounds.
    pub fn set_clips_to_bounds(&mut self, id: ViewId, on: bool) {
        self.set_flag(id, ViewFlags::CLIPS_TO_BOUNDS, on);
        self.invalidate_render_cache(id);
    }

    /// Render the view into its own texture, composited by its `post_render` hook.
    pub fn set_renders_to_texture(&mut self, id: ViewId, on: bool) {
        self.set_flag(id, ViewFlags::RENDERS_TO_TEXTURE, on);
        self.invalidate_render_cache(id);
        self.release_unused_render_texture(id);
    }

    /// Keep the view's rendered texture between frames until the render cache is
    /// invalidated.
    pub fn set_caches_render(&mut self, id: ViewId, on: bool) {
        self.set_flag(id, ViewFlags::CACHES_RENDER, on);
        self.invalidate_render_cache(id);
        self.release_unused_render_texture(id);
    }

    // --- Hook plumbing ---

    /// Run `f` with the behavior of `id` taken out of its slot.
    ///
    /// Mutations the hook queues are appended to the deferred queue; they run at the next
    /// [`Application::flush`].
    pub(crate) fn with_view<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn View, &mut ViewCx<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self.views.get_mut(id)?.behavior.take()?;
        let mut queued = Vec::new();
        let result = {
            let mut cx = ViewCx::new(&*self, id, &mut queued);
            f(behavior.as_mut(), &mut cx)
        };
        if let Some(node) = self.views.get_mut(id) {
            node.behavior = Some(behavior);
        }
        self.deferred.extend(queued);
        Some(result)
    }

    /// Queue mutations collected outside [`Application::with_view`].
    pub(crate) fn enqueue(&mut self, ops: Vec<Deferred>) {
        self.deferred.extend(ops);
    }

    /// Apply mutations queued by hooks, including any they queue in turn.
    pub(crate) fn flush(&mut self) {
        if self.flushing {
            return;
        }
        self.flushing = true;
        while let Some(op) = self.deferred.pop_front() {
            op(self);
        }
        self.flushing = false;
    }

    // --- Application-wide services ---

    /// The shared download cache.
    pub fn downloads(&self) -> &DownloadCache {
        &self.downloads
    }

    /// Request `url` through the download cache.
    ///
    /// With `use_cache`, a previously downloaded result is returned immediately. Concurrent
    /// requests for the same URL share one transfer either way.
    pub fn download(&self, url: &str, use_cache: bool) -> Pending {
        if use_cache {
            self.downloads.download(url)
        } else {
            self.downloads.download_uncached(url)
        }
    }

    /// Approximate bytes held by the download cache.
    pub fn download_cache_size(&self) -> usize {
        self.downloads.byte_size()
    }

    /// Purge least recently used downloads until at most `max_bytes` are held.
    pub fn purge_download_cache(&self, max_bytes: usize) -> usize {
        self.downloads.purge(max_bytes)
    }

    /// Release memory that can be recreated on demand.
    ///
    /// Drops idle cached downloads (when configured) and sweeps unreferenced entries from
    /// every window's resource caches.
    pub fn low_memory(&mut self) {
        if self.config.purge_downloads_on_low_memory {
            self.downloads.purge(0);
        }
        let ids: Vec<WindowId> = self.windows.ids().collect();
        for id in ids {
            if let Some(window) = self.windows.get(id) {
                window.sweep_caches();
            }
        }
        tracing::debug!("handled low memory notification");
    }
}
