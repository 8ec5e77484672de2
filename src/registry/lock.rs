#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

#[repr(transparent)]
pub(super) struct RegistryLock<T>(impl_::RwLock<T>);

#[repr(transparent)]
pub(super) struct RegistryReadGuard<'a, T>(impl_::RwLockReadGuard<'a, T>);

#[repr(transparent)]
pub(super) struct RegistryWriteGuard<'a, T>(impl_::RwLockWriteGuard<'a, T>);

impl<T> RegistryLock<T> {
    #[must_use]
    pub(super) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    #[inline]
    pub(super) fn read(&self) -> RegistryReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // Entries are inserted fully formed, so a poisoned map is still consistent.
        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(impl_::PoisonError::into_inner);

        RegistryReadGuard(guard)
    }

    #[inline]
    pub(super) fn write(&self) -> RegistryWriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().unwrap_or_else(impl_::PoisonError::into_inner);

        RegistryWriteGuard(guard)
    }
}

impl<T> core::ops::Deref for RegistryReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::Deref for RegistryWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for RegistryWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
